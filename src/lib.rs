pub mod config;
pub mod contracts;
pub mod database;
pub mod logging;
pub mod runtime;
pub mod test_utils;
