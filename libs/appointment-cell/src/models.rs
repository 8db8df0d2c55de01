use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use patient_cell::Patient;
use shared_models::SchedulingError;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// A patient's visit with a doctor.
///
/// Holding an `Appointment` reserves nothing; the slot is taken only when it
/// goes through [`crate::BookingService::book`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub patient: Patient,
    pub doctor_id: u32,
    /// ISO-8601 local date and time, e.g. `2025-03-10T09:00`.
    pub date_time: String,
    pub reason: String,
}

impl Appointment {
    pub fn new(
        patient: Patient,
        doctor_id: u32,
        date_time: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            patient,
            doctor_id,
            date_time: date_time.into(),
            reason: reason.into(),
        }
    }

    pub fn scheduled_at(&self) -> Result<NaiveDateTime, AppointmentError> {
        let raw = self.date_time.trim();
        DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .ok_or_else(|| AppointmentError::InvalidDateTime(self.date_time.clone()))
    }

    /// Weekday and hour of the slot this appointment occupies.
    /// Appointments must start on the hour.
    pub fn slot(&self) -> Result<(Weekday, u32), AppointmentError> {
        let at = self.scheduled_at()?;
        if at.minute() != 0 || at.second() != 0 {
            return Err(AppointmentError::InvalidDateTime(format!(
                "{} does not start on the hour",
                self.date_time
            )));
        }
        Ok((at.weekday(), at.hour()))
    }

    /// Text stored in the doctor's slot for this booking.
    pub fn details(&self) -> String {
        format!("{} (#{}): {}", self.patient.name, self.patient.patient_id, self.reason)
    }

    /// Same appointment moved to `hour` on the same date.
    pub(crate) fn at_hour(&self, hour: u32) -> Result<Self, AppointmentError> {
        let at = self
            .scheduled_at()?
            .with_hour(hour)
            .ok_or_else(|| AppointmentError::InvalidDateTime(format!("hour {}", hour)))?;
        Ok(Self {
            date_time: at.format("%Y-%m-%dT%H:%M").to_string(),
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Doctor not found: badge {0}")]
    DoctorNotFound(u32),

    #[error("Doctor with badge {0} is already registered")]
    DuplicateBadge(u32),

    #[error("Invalid appointment time: {0}")]
    InvalidDateTime(String),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}
