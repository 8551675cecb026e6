mod ingestor;
mod simulated;
mod tracker;
