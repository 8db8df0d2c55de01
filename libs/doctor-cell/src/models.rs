use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Days of the week in calendar order, Monday first.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn day_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// Detached copy of a weekly schedule, for display layers.
///
/// Owns its data; editing it has no effect on the schedule it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub start_hour: u32,
    pub end_hour: u32,
    pub days: Vec<DaySlots>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    pub day: Weekday,
    /// One entry per working hour; `None` means available.
    pub slots: Vec<Option<String>>,
}

impl ScheduleSnapshot {
    pub fn day(&self, day: Weekday) -> Option<&[Option<String>]> {
        self.days
            .iter()
            .find(|d| d.day == day)
            .map(|d| d.slots.as_slice())
    }

    pub fn day_mut(&mut self, day: Weekday) -> Option<&mut Vec<Option<String>>> {
        self.days
            .iter_mut()
            .find(|d| d.day == day)
            .map(|d| &mut d.slots)
    }

    /// Details stored at `(day, hour)`, or `None` if free or outside the window.
    pub fn slot(&self, day: Weekday, hour: u32) -> Option<&str> {
        let index = hour.checked_sub(self.start_hour)? as usize;
        self.day(day)?.get(index)?.as_deref()
    }
}
