use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures raised by the scheduling core.
///
/// These describe caller misuse and are never retried. Booking conflicts are
/// not errors; they surface as a `false` return from the calendar.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingError {
    #[error("Invalid hour {hour}: must be between {start_hour} and {last}", last = .end_hour.saturating_sub(1))]
    InvalidHour {
        hour: u32,
        start_hour: u32,
        end_hour: u32,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SchedulingError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SchedulingError::InvalidArgument(msg.into())
    }

    pub fn is_invalid_hour(&self) -> bool {
        matches!(self, SchedulingError::InvalidHour { .. })
    }
}
