use thiserror::Error;

use crate::types::{ReceivableId, SaleId};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Receivable not found: {0}")]
    ReceivableNotFound(ReceivableId),

    #[error("Store failure: {0}")]
    StoreFailure(String),

    #[error("Schedule mutation already in progress for sale {0}")]
    SaleBusy(SaleId),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ScheduleError {
    fn from(e: serde_json::Error) -> Self {
        ScheduleError::SerializationError(e.to_string())
    }
}
