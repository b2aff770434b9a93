pub mod enrichment;
pub mod export;
pub mod reconcile;
pub mod units;
