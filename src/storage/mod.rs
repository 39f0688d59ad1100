pub mod memory;
pub mod retention;

pub use memory::{StatusStore, StoreStats};
pub use retention::{EvictionReport, RetentionPolicy, RetentionSweeper};
