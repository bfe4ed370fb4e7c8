mod context;
pub mod dot_path_buf;
mod error;
mod events;
mod interface;
mod registry;
pub mod stack;
mod storage;
mod types;

use std::{future::Future, pin::Pin, sync::Arc};

use bon::Builder;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub use context::{ProcContext, ReadContext, ViewContext};
pub use dot_path_buf::DotPathBuf;
pub use error::{Error, ErrorKind};
pub use events::{Event, EventRecord};
pub use interface::{Args, Contract, EntryPoint, Interface, Kind, Param};
pub use registry::Registry;
pub use storage::{Storage, Transaction, deserialize_cbor, serialize_cbor};
pub use types::{Address, Type, Value};

use crate::database::types::{CallRow, ContractRow};
use stack::StackError;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 16;

type CallFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, Error>> + Send + 'a>>;

#[derive(Debug, Clone, Builder)]
pub struct RuntimeConfig {
    #[builder(default = DEFAULT_MAX_CALL_DEPTH)]
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn stack_error(target: Address, e: StackError) -> Error {
    match e {
        StackError::CycleDetected(_) => Error::Reentrancy(target),
        StackError::DepthExceeded(limit) => Error::CallDepthExceeded(limit),
    }
}

/// Dispatches calls to deployed contract instances.
///
/// Every top-level deploy or call runs against a fresh [`Transaction`] and is
/// serialized behind a single lock, so a call tree either commits as a whole
/// or leaves no trace besides its entry in the call log.
#[derive(Clone)]
pub struct Runtime {
    pub storage: Storage,
    registry: Registry,
    config: RuntimeConfig,
    lock: Arc<Mutex<()>>,
}

impl Runtime {
    pub fn new(storage: Storage, registry: Registry, config: RuntimeConfig) -> Self {
        Self {
            storage,
            registry,
            config,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn transaction(&self) -> Transaction {
        Transaction::new(self.config.max_call_depth)
    }

    /// Instantiates `code` on behalf of `deployer` and runs its constructor.
    /// The returned address is stable for a given deployer, deployment count
    /// and code.
    pub async fn deploy(
        &self,
        deployer: Address,
        code: &str,
        args: Vec<Value>,
    ) -> Result<Address, Error> {
        let _guard = self.lock.lock().await;
        let nonce = self.storage.deployment_count(&deployer).await?;
        let address = Address::derive(&deployer, nonce, code);
        let mut tx = self.transaction();
        let result = self.construct(&mut tx, deployer, address, code, args).await;
        let outcome = result.map(|()| address.to_string());
        let version = self.settle(tx, deployer, address, "new", outcome).await?;
        info!("Deployed {} at {} (version {})", code, address, version);
        Ok(address)
    }

    async fn construct(
        &self,
        tx: &mut Transaction,
        deployer: Address,
        address: Address,
        code: &str,
        args: Vec<Value>,
    ) -> Result<(), Error> {
        let contract = self
            .registry
            .get(code)
            .ok_or_else(|| Error::UnknownCode(code.to_string()))?;
        let args = Args::check(args, contract.interface().constructor)?;
        tx.register(
            ContractRow::builder()
                .address(address)
                .code(code.to_string())
                .deployer(deployer)
                .build(),
        );
        tx.stack.push(address).map_err(|e| stack_error(address, e))?;
        let result = {
            let mut ctx = ProcContext {
                runtime: self,
                tx: &mut *tx,
                contract: address,
                caller: deployer,
            };
            contract.construct(&mut ctx, &args).await
        };
        tx.stack.pop();
        result
    }

    /// Runs a top-level call and commits its whole call tree, or nothing.
    pub async fn execute(
        &self,
        caller: Address,
        target: Address,
        selector: &str,
        args: Vec<Value>,
    ) -> Result<Value, Error> {
        let _guard = self.lock.lock().await;
        let mut tx = self.transaction();
        let result = self.call_in(&mut tx, caller, target, selector, args).await;
        let outcome = result.as_ref().map(Value::to_string).map_err(Error::clone);
        let version = self.settle(tx, caller, target, selector, outcome).await?;
        info!("{} on {} committed at version {}", selector, target, version);
        result
    }

    /// Commits `tx` when the call succeeded. A failed call, or a commit that
    /// fails, leaves only a failed entry in the call log.
    async fn settle(
        &self,
        tx: Transaction,
        caller: Address,
        contract: Address,
        selector: &str,
        outcome: Result<String, Error>,
    ) -> Result<i64, Error> {
        let row = |ok: bool, value: String| {
            CallRow::builder()
                .caller(caller)
                .contract(contract)
                .selector(selector.to_string())
                .ok(ok)
                .value(value)
                .build()
        };
        let e = match outcome {
            Ok(value) => match self.storage.commit(tx, row(true, value)).await {
                Ok(version) => return Ok(version),
                Err(e) => e,
            },
            Err(e) => e,
        };
        warn!("{} on {} rolled back: {}", selector, contract, e);
        self.storage.record_failure(row(false, e.to_string())).await?;
        Err(e)
    }

    /// Evaluates a query entry point against committed state.
    pub async fn query(
        &self,
        target: Address,
        selector: &str,
        args: Vec<Value>,
    ) -> Result<Value, Error> {
        let _guard = self.lock.lock().await;
        let tx = self.transaction();
        self.query_in(&tx, None, target, selector, args, 1).await
    }

    pub async fn interface(&self, address: &Address) -> Result<&'static Interface, Error> {
        let _guard = self.lock.lock().await;
        let contract = self.resolve(&self.transaction(), address).await?;
        Ok(contract.interface())
    }

    pub async fn events(&self, address: &Address) -> Result<Vec<EventRecord>, Error> {
        let _guard = self.lock.lock().await;
        self.storage.events(address).await
    }

    pub async fn calls(&self) -> Result<Vec<CallRow>, Error> {
        let _guard = self.lock.lock().await;
        self.storage.calls().await
    }

    async fn resolve(
        &self,
        tx: &Transaction,
        address: &Address,
    ) -> Result<Arc<dyn Contract>, Error> {
        let code = match tx.deployed(address) {
            Some(row) => row.code.clone(),
            None => {
                self.storage
                    .contract(address)
                    .await?
                    .ok_or(Error::NoSuchContract(*address))?
                    .code
            }
        };
        self.registry.get(&code).ok_or(Error::UnknownCode(code))
    }

    pub(crate) fn call_in<'a>(
        &'a self,
        tx: &'a mut Transaction,
        caller: Address,
        target: Address,
        selector: &'a str,
        args: Vec<Value>,
    ) -> CallFuture<'a> {
        Box::pin(async move {
            let contract = self.resolve(tx, &target).await?;
            let entry = contract.interface().entry_point(selector)?;
            let args = Args::check(args, entry.params)?;
            tx.stack.push(target).map_err(|e| stack_error(target, e))?;
            tx.savepoint();
            debug!("Calling {} on {} from {}", selector, target, caller);
            let result = match entry.kind {
                Kind::Query => {
                    let ctx = ViewContext {
                        runtime: self,
                        tx: &*tx,
                        contract: target,
                        caller: Some(caller),
                        depth: tx.depth(),
                    };
                    contract.query(&ctx, selector, &args).await
                }
                Kind::Mutating => {
                    let mut ctx = ProcContext {
                        runtime: self,
                        tx: &mut *tx,
                        contract: target,
                        caller,
                    };
                    contract.execute(&mut ctx, selector, &args).await
                }
            };
            tx.stack.pop();
            match &result {
                Ok(_) => tx.release(),
                Err(e) => {
                    debug!("Discarding writes of {} on {}: {}", selector, target, e);
                    tx.rollback();
                }
            }
            result
        })
    }

    pub(crate) fn query_in<'a>(
        &'a self,
        tx: &'a Transaction,
        caller: Option<Address>,
        target: Address,
        selector: &'a str,
        args: Vec<Value>,
        depth: usize,
    ) -> CallFuture<'a> {
        Box::pin(async move {
            let contract = self.resolve(tx, &target).await?;
            let entry = contract.interface().entry_point(selector)?;
            if entry.kind == Kind::Mutating {
                return Err(Error::ReadOnly(selector.to_string()));
            }
            let args = Args::check(args, entry.params)?;
            if depth > self.config.max_call_depth {
                return Err(Error::CallDepthExceeded(self.config.max_call_depth));
            }
            let ctx = ViewContext {
                runtime: self,
                tx,
                contract: target,
                caller,
                depth,
            };
            contract.query(&ctx, selector, &args).await
        })
    }
}
