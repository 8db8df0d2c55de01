use std::cmp::Ordering;
use std::fmt;

use chrono::Weekday;
use tracing::debug;

use shared_models::SchedulingError;

use crate::models::ScheduleSnapshot;
use crate::services::schedule::WeeklySchedule;

/// A doctor and the weekly schedule they own.
///
/// Slot operations forward to the schedule with the same contracts. The
/// badge id is the natural key: ordering is by badge, and callers keep it
/// unique within a roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Doctor {
    name: String,
    badge_id: u32,
    specialty: String,
    schedule: WeeklySchedule,
}

impl Doctor {
    pub fn new(
        name: impl Into<String>,
        badge_id: u32,
        specialty: impl Into<String>,
        schedule: WeeklySchedule,
    ) -> Result<Self, SchedulingError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            badge_id,
            specialty: specialty.into(),
            schedule,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), SchedulingError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn badge_id(&self) -> u32 {
        self.badge_id
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    pub fn book_appointment(
        &mut self,
        day: Weekday,
        hour: u32,
        details: impl Into<String>,
    ) -> Result<bool, SchedulingError> {
        debug!(badge_id = self.badge_id, "Booking {:?} {:02}:00", day, hour);
        self.schedule.book(day, hour, details)
    }

    pub fn cancel_appointment(&mut self, day: Weekday, hour: u32) -> Result<bool, SchedulingError> {
        debug!(badge_id = self.badge_id, "Cancelling {:?} {:02}:00", day, hour);
        self.schedule.cancel(day, hour)
    }

    pub fn is_available(&self, day: Weekday, hour: u32) -> Result<bool, SchedulingError> {
        self.schedule.is_available(day, hour)
    }

    pub fn get_slot(&self, day: Weekday, hour: u32) -> Result<Option<&str>, SchedulingError> {
        self.schedule.get_slot(day, hour)
    }

    pub fn export_schedule(&self) -> ScheduleSnapshot {
        self.schedule.export_snapshot()
    }
}

fn validate_name(name: &str) -> Result<(), SchedulingError> {
    if name.trim().is_empty() {
        return Err(SchedulingError::invalid_argument("Doctor name must not be blank"));
    }
    Ok(())
}

impl Ord for Doctor {
    fn cmp(&self, other: &Self) -> Ordering {
        // Badge decides; the rest only separates records sharing a badge so
        // that `Equal` coincides with `==`.
        self.badge_id
            .cmp(&other.badge_id)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.specialty.cmp(&other.specialty))
            .then_with(|| self.schedule.cmp(&other.schedule))
    }
}

impl PartialOrd for Doctor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Doctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dr. {} (badge #{}, {})", self.name, self.badge_id, self.specialty)?;
        write!(f, "{}", self.schedule)
    }
}
