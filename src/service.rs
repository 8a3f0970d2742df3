pub mod aggregator;
pub mod filter;
pub mod writer;
