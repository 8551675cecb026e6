pub mod error;
pub mod executor;
pub mod retry;
pub mod transport;
pub mod trino;
