use std::env;
use serde::{Deserialize, Serialize};
use tracing::warn;

use shared_models::SchedulingError;

pub const DEFAULT_START_HOUR: u32 = 8;
pub const DEFAULT_END_HOUR: u32 = 17;

/// Working-hour window applied to every doctor's weekly calendar.
///
/// `start_hour` is inclusive, `end_hour` exclusive. Always a valid window:
/// every constructor, deserialization included, goes through
/// [`validate_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WorkingHours")]
pub struct SchedulingConfig {
    start_hour: u32,
    end_hour: u32,
}

#[derive(Deserialize)]
struct WorkingHours {
    start_hour: u32,
    end_hour: u32,
}

impl TryFrom<WorkingHours> for SchedulingConfig {
    type Error = SchedulingError;

    fn try_from(hours: WorkingHours) -> Result<Self, Self::Error> {
        Self::new(hours.start_hour, hours.end_hour)
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }
}

impl SchedulingConfig {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, SchedulingError> {
        validate_window(start_hour, end_hour)?;
        Ok(Self { start_hour, end_hour })
    }

    pub fn from_env() -> Self {
        let start_hour = hour_from_env("CLINIC_START_HOUR", DEFAULT_START_HOUR);
        let end_hour = hour_from_env("CLINIC_END_HOUR", DEFAULT_END_HOUR);

        match Self::new(start_hour, end_hour) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}, using default working hours", e);
                Self::default()
            }
        }
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn slots_per_day(&self) -> u32 {
        self.end_hour - self.start_hour
    }
}

/// Checks `0 <= start_hour < end_hour <= 24`.
pub fn validate_window(start_hour: u32, end_hour: u32) -> Result<(), SchedulingError> {
    if end_hour > 24 || start_hour >= end_hour {
        return Err(SchedulingError::invalid_argument(format!(
            "Invalid working hours {}-{}",
            start_hour, end_hour
        )));
    }
    Ok(())
}

fn hour_from_env(key: &str, default: u32) -> u32 {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} is not a valid hour ({:?}), using default {}", key, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", key, default);
            default
        }
    }
}
