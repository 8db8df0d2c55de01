use std::fmt;
use std::ops::Range;

use chrono::Weekday;
use tracing::{debug, warn};

use shared_config::{validate_window, SchedulingConfig, DEFAULT_END_HOUR, DEFAULT_START_HOUR};
use shared_models::SchedulingError;

use crate::models::{day_label, DaySlots, ScheduleSnapshot, WEEK};

/// Hourly booking grid for one doctor over a seven-day week.
///
/// Every day holds exactly `slots_per_day` cells covering
/// `start_hour..end_hour`. A cell is either free (`None`) or holds the
/// details of the single booking occupying it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeeklySchedule {
    start_hour: u32,
    end_hour: u32,
    slots_per_day: u32,
    slots: [Vec<Option<String>>; 7],
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::build(DEFAULT_START_HOUR, DEFAULT_END_HOUR)
    }
}

impl WeeklySchedule {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, SchedulingError> {
        validate_window(start_hour, end_hour)?;
        Ok(Self::build(start_hour, end_hour))
    }

    pub fn from_config(config: &SchedulingConfig) -> Result<Self, SchedulingError> {
        Self::new(config.start_hour(), config.end_hour())
    }

    fn build(start_hour: u32, end_hour: u32) -> Self {
        let slots_per_day = end_hour - start_hour;
        Self {
            start_hour,
            end_hour,
            slots_per_day,
            slots: std::array::from_fn(|_| vec![None; slots_per_day as usize]),
        }
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn slots_per_day(&self) -> u32 {
        self.slots_per_day
    }

    pub fn hours(&self) -> Range<u32> {
        self.start_hour..self.end_hour
    }

    /// Books `(day, hour)` with `details`.
    ///
    /// Returns `Ok(false)` without touching the cell if it is already booked.
    pub fn book(
        &mut self,
        day: Weekday,
        hour: u32,
        details: impl Into<String>,
    ) -> Result<bool, SchedulingError> {
        let index = self.validate_hour(hour)?;
        let cell = &mut self.slots[day_index(day)][index];
        if cell.is_some() {
            debug!("Slot {:?} {:02}:00 already booked", day, hour);
            return Ok(false);
        }
        *cell = Some(details.into());
        debug!("Booked slot {:?} {:02}:00", day, hour);
        Ok(true)
    }

    /// Frees `(day, hour)`. Returns `Ok(false)` if there was nothing to cancel.
    pub fn cancel(&mut self, day: Weekday, hour: u32) -> Result<bool, SchedulingError> {
        let index = self.validate_hour(hour)?;
        let cancelled = self.slots[day_index(day)][index].take().is_some();
        if cancelled {
            debug!("Cancelled slot {:?} {:02}:00", day, hour);
        }
        Ok(cancelled)
    }

    pub fn is_available(&self, day: Weekday, hour: u32) -> Result<bool, SchedulingError> {
        let index = self.validate_hour(hour)?;
        Ok(self.slots[day_index(day)][index].is_none())
    }

    pub fn get_slot(&self, day: Weekday, hour: u32) -> Result<Option<&str>, SchedulingError> {
        let index = self.validate_hour(hour)?;
        Ok(self.slots[day_index(day)][index].as_deref())
    }

    /// Free hours of `day`, ascending.
    pub fn available_hours(&self, day: Weekday) -> Vec<u32> {
        self.hours()
            .zip(&self.slots[day_index(day)])
            .filter(|(_, cell)| cell.is_none())
            .map(|(hour, _)| hour)
            .collect()
    }

    pub fn booked_count(&self) -> usize {
        self.slots.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    pub fn export_snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            start_hour: self.start_hour,
            end_hour: self.end_hour,
            days: WEEK
                .iter()
                .map(|&day| DaySlots {
                    day,
                    slots: self.slots[day_index(day)].clone(),
                })
                .collect(),
        }
    }

    fn validate_hour(&self, hour: u32) -> Result<usize, SchedulingError> {
        if hour < self.start_hour || hour >= self.end_hour {
            warn!(
                "Rejected hour {} outside working hours {}-{}",
                hour, self.start_hour, self.end_hour
            );
            return Err(SchedulingError::InvalidHour {
                hour,
                start_hour: self.start_hour,
                end_hour: self.end_hour,
            });
        }
        Ok((hour - self.start_hour) as usize)
    }
}

fn day_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

impl fmt::Display for WeeklySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in WEEK {
            write!(f, "\n--- {} ---\n", day_label(day))?;
            for (hour, cell) in self.hours().zip(&self.slots[day_index(day)]) {
                writeln!(
                    f,
                    "{:02}:00-{:02}:00: {}",
                    hour,
                    hour + 1,
                    cell.as_deref().unwrap_or("Available")
                )?;
            }
        }
        Ok(())
    }
}
