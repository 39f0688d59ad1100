pub mod clock;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, StoreError};
pub use types::{Snapshot, StatusUpdate, Timestamp};
