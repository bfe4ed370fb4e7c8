use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::{
    logging,
    runtime::{DEFAULT_MAX_CALL_DEPTH, RuntimeConfig},
};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[clap(
    version = "0.1.0",
    about = "crosscall",
    long_about = r#"crosscall hosts contracts that call each other atomically"#
)]
pub struct Config {
    #[clap(
        long,
        env = "LOG_FORMAT",
        help = "Log format (plain, json)",
        default_value = "plain"
    )]
    pub log_format: logging::Format,

    #[clap(
        long,
        env = "DATA_DIR",
        help = "Directory holding the state database",
        default_value = "."
    )]
    pub data_dir: PathBuf,

    #[clap(
        long,
        env = "DATABASE_NAME",
        help = "File name of the state database within the data directory",
        default_value = "state.db"
    )]
    pub database_name: String,

    #[clap(
        long,
        env = "MAX_CALL_DEPTH",
        help = "Maximum number of nested contract calls in one call tree",
        default_value_t = DEFAULT_MAX_CALL_DEPTH
    )]
    pub max_call_depth: usize,
}

impl Config {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_name)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::builder()
            .max_call_depth(self.max_call_depth)
            .build()
    }
}
