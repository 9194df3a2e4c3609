pub mod engine;
pub mod error;
pub mod net_value;
pub mod plan;
pub mod recalc;
pub mod schedule;
pub mod store;
pub mod types;

pub use engine::ScheduleEngine;
pub use error::ScheduleError;
pub use types::*;

/// Standard result type for all scheduling operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;
