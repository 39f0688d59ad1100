// ============================================================================
// Status Registry Library
// ============================================================================

pub mod config;
pub mod core;
pub mod shutdown;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::core::{
    Clock, ManualClock, Result, Snapshot, StatusUpdate, StoreError, SystemClock, Timestamp,
};
pub use crate::storage::{
    EvictionReport, RetentionPolicy, RetentionSweeper, StatusStore, StoreStats,
};
pub use crate::web::{AppState, WebError, build_router};
