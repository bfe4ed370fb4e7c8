use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use crosscall::{
    config::Config,
    contracts, logging,
    runtime::{Address, Runtime, Storage, Value},
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "crosscall", about = "Deploy and call contracts against a local state database")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Deploy a contract code and print its address.
    Deploy {
        #[arg(long, help = "Deployer address, 64 hex characters or @seed")]
        from: Address,
        code: String,
        #[arg(help = "Constructor arguments: true|false, (), u128, address or @seed")]
        args: Vec<String>,
    },
    /// Run a mutating entry point in its own call tree.
    Call {
        #[arg(long, help = "Caller address, 64 hex characters or @seed")]
        from: Address,
        contract: Address,
        selector: String,
        args: Vec<String>,
    },
    /// Evaluate a query entry point against committed state.
    Query {
        contract: Address,
        selector: String,
        args: Vec<String>,
    },
    /// Print the interface of a deployed contract.
    Interface { contract: Address },
    /// Print the committed events of a contract.
    Events { contract: Address },
    /// Print the call log.
    Calls,
    /// List the contract codes available for deployment.
    Codes,
}

fn parse_args(args: &[String]) -> Result<Vec<Value>> {
    args.iter()
        .map(|s| s.parse::<Value>().map_err(|e| anyhow!(e)))
        .collect()
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup(cli.config.log_format);
    let path = cli.config.database_path();
    info!("Opening state database at {}", path.display());
    let storage = Storage::open(&path).await?;
    let runtime = Runtime::new(storage, contracts::native(), cli.config.runtime_config());

    match cli.command {
        Command::Deploy { from, code, args } => {
            let address = runtime.deploy(from, &code, parse_args(&args)?).await?;
            print(&address)
        }
        Command::Call {
            from,
            contract,
            selector,
            args,
        } => {
            let value = runtime
                .execute(from, contract, &selector, parse_args(&args)?)
                .await?;
            print(&value)
        }
        Command::Query {
            contract,
            selector,
            args,
        } => {
            let value = runtime
                .query(contract, &selector, parse_args(&args)?)
                .await?;
            print(&value)
        }
        Command::Interface { contract } => print(runtime.interface(&contract).await?),
        Command::Events { contract } => print(&runtime.events(&contract).await?),
        Command::Calls => print(&runtime.calls().await?),
        Command::Codes => {
            let mut codes = runtime.registry().codes().collect::<Vec<_>>();
            codes.sort();
            print(&codes)
        }
    }
}
