pub mod config;
pub mod error;
pub mod ingestor;
pub mod metrics;
pub mod provisioner;
pub mod scheduler;
pub mod tracker;

#[cfg(test)]
mod tests;
