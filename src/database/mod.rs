mod connection;
pub mod queries;
mod tables;
pub mod types;

pub use connection::{new_connection, new_memory_connection};
