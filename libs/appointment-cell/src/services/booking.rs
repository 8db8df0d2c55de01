use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, Weekday};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use doctor_cell::{Doctor, ScheduleSnapshot, WeeklySchedule};
use shared_config::SchedulingConfig;

use crate::models::{Appointment, AppointmentError};

/// Appointment management over a roster of doctors.
///
/// Each doctor sits behind its own lock, so two bookings for the same slot
/// are serialised and exactly one of them wins. Bookings for different
/// doctors do not contend.
pub struct BookingService {
    config: SchedulingConfig,
    doctors: RwLock<BTreeMap<u32, Arc<Mutex<Doctor>>>>,
    appointments: Mutex<Vec<Appointment>>,
}

impl Default for BookingService {
    fn default() -> Self {
        Self::new(SchedulingConfig::default())
    }
}

impl BookingService {
    pub fn new(config: SchedulingConfig) -> Self {
        Self {
            config,
            doctors: RwLock::new(BTreeMap::new()),
            appointments: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Adds a doctor with an empty schedule over the configured working hours.
    pub fn hire(
        &self,
        name: impl Into<String>,
        badge_id: u32,
        specialty: impl Into<String>,
    ) -> Result<(), AppointmentError> {
        let schedule = WeeklySchedule::from_config(&self.config)?;
        self.register_doctor(Doctor::new(name, badge_id, specialty, schedule)?)
    }

    pub fn register_doctor(&self, doctor: Doctor) -> Result<(), AppointmentError> {
        let badge_id = doctor.badge_id();
        match self.doctors.write().entry(badge_id) {
            Entry::Occupied(_) => {
                warn!("Rejected duplicate doctor badge {}", badge_id);
                Err(AppointmentError::DuplicateBadge(badge_id))
            }
            Entry::Vacant(slot) => {
                info!("Registered Dr. {} (badge {}, {})", doctor.name(), badge_id, doctor.specialty());
                slot.insert(Arc::new(Mutex::new(doctor)));
                Ok(())
            }
        }
    }

    pub fn doctor_ids(&self) -> Vec<u32> {
        self.doctors.read().keys().copied().collect()
    }

    pub fn doctors_with_specialty(&self, specialty: &str) -> Vec<u32> {
        self.doctors
            .read()
            .iter()
            .filter(|(_, doctor)| doctor.lock().specialty().eq_ignore_ascii_case(specialty))
            .map(|(&badge_id, _)| badge_id)
            .collect()
    }

    /// Reserves the appointment's slot on its doctor's schedule.
    ///
    /// `Ok(false)` means the slot is already taken.
    pub fn book(&self, appointment: &Appointment) -> Result<bool, AppointmentError> {
        let (day, hour) = appointment.slot()?;
        let handle = self.doctor_handle(appointment.doctor_id)?;
        let mut doctor = handle.lock();

        if !doctor.book_appointment(day, hour, appointment.details())? {
            warn!(
                "Slot {:?} {:02}:00 for badge {} is already booked",
                day, hour, appointment.doctor_id
            );
            return Ok(false);
        }

        self.appointments.lock().push(appointment.clone());
        info!(
            "Booked patient {} with badge {} at {}",
            appointment.patient.patient_id, appointment.doctor_id, appointment.date_time
        );
        Ok(true)
    }

    /// Releases the slot held by a previously booked appointment.
    ///
    /// `Ok(false)` if this exact appointment (doctor, patient, reason and
    /// date) was never booked or is already cancelled.
    pub fn cancel(&self, appointment: &Appointment) -> Result<bool, AppointmentError> {
        let (day, hour) = appointment.slot()?;
        let scheduled_at = appointment.scheduled_at()?;
        let handle = self.doctor_handle(appointment.doctor_id)?;
        let mut doctor = handle.lock();
        let mut appointments = self.appointments.lock();

        let Some(index) = find_booking(&appointments, appointment, scheduled_at) else {
            debug!("No booking to cancel at {} for badge {}", appointment.date_time, appointment.doctor_id);
            return Ok(false);
        };
        doctor.cancel_appointment(day, hour)?;
        appointments.remove(index);

        info!(
            "Cancelled patient {} with badge {} at {}",
            appointment.patient.patient_id, appointment.doctor_id, appointment.date_time
        );
        Ok(true)
    }

    /// Moves a booked appointment to `new_date_time` with the same doctor.
    ///
    /// The new slot is taken before the old one is released, so on
    /// `Ok(false)` (appointment not booked, or new slot taken) and on error
    /// the original booking is untouched.
    pub fn reschedule(
        &self,
        appointment: &Appointment,
        new_date_time: impl Into<String>,
    ) -> Result<bool, AppointmentError> {
        let (old_day, old_hour) = appointment.slot()?;
        let scheduled_at = appointment.scheduled_at()?;
        let moved = Appointment {
            date_time: new_date_time.into(),
            ..appointment.clone()
        };
        let (new_day, new_hour) = moved.slot()?;

        let handle = self.doctor_handle(appointment.doctor_id)?;
        let mut doctor = handle.lock();
        let mut appointments = self.appointments.lock();

        let Some(index) = find_booking(&appointments, appointment, scheduled_at) else {
            debug!("No booking to reschedule at {} for badge {}", appointment.date_time, appointment.doctor_id);
            return Ok(false);
        };

        // Same weekly slot on another date: only the record changes.
        if (new_day, new_hour) != (old_day, old_hour) {
            if !doctor.book_appointment(new_day, new_hour, moved.details())? {
                warn!(
                    "Cannot move booking to {:?} {:02}:00 for badge {}: slot taken",
                    new_day, new_hour, appointment.doctor_id
                );
                return Ok(false);
            }
            doctor.cancel_appointment(old_day, old_hour)?;
        }

        info!(
            "Rescheduled patient {} with badge {} from {} to {}",
            appointment.patient.patient_id, appointment.doctor_id, appointment.date_time, moved.date_time
        );
        appointments[index] = moved;
        Ok(true)
    }

    /// Books the requested hour or, failing that, the next free hour later
    /// the same day. Returns the appointment as booked, or `None` when the
    /// rest of the day is full.
    pub fn book_next_available(
        &self,
        appointment: &Appointment,
    ) -> Result<Option<Appointment>, AppointmentError> {
        let (day, from_hour) = appointment.slot()?;
        let handle = self.doctor_handle(appointment.doctor_id)?;
        let mut doctor = handle.lock();

        // Out-of-window start hours fail here, before any slot is touched.
        doctor.is_available(day, from_hour)?;
        let end_hour = doctor.schedule().end_hour();

        for hour in from_hour..end_hour {
            if doctor.book_appointment(day, hour, appointment.details())? {
                let booked = appointment.at_hour(hour)?;
                if hour != from_hour {
                    debug!("Moved booking from {:02}:00 to {:02}:00", from_hour, hour);
                }
                self.appointments.lock().push(booked.clone());
                info!(
                    "Booked patient {} with badge {} at {}",
                    booked.patient.patient_id, booked.doctor_id, booked.date_time
                );
                return Ok(Some(booked));
            }
        }

        warn!("No free slot left on {:?} for badge {}", day, appointment.doctor_id);
        Ok(None)
    }

    /// Lowest badge among doctors of `specialty` who are free at `(day, hour)`.
    /// Doctors whose working hours do not cover `hour` are skipped.
    pub fn find_available_doctor(&self, specialty: &str, day: Weekday, hour: u32) -> Option<u32> {
        self.doctors
            .read()
            .iter()
            .find(|(_, handle)| {
                let doctor = handle.lock();
                doctor.specialty().eq_ignore_ascii_case(specialty)
                    && matches!(doctor.is_available(day, hour), Ok(true))
            })
            .map(|(&badge_id, _)| badge_id)
    }

    pub fn appointments_chronological(&self) -> Vec<Appointment> {
        let mut appointments = self.appointments.lock().clone();
        appointments.sort_by_key(|a| a.scheduled_at().ok());
        appointments
    }

    pub fn appointments_for_doctor(&self, badge_id: u32) -> Vec<Appointment> {
        let mut appointments = self.appointments_chronological();
        appointments.retain(|a| a.doctor_id == badge_id);
        appointments
    }

    /// Appointments with any doctor of `specialty`, in date order.
    pub fn appointments_for_specialty(&self, specialty: &str) -> Vec<Appointment> {
        let badges = self.doctors_with_specialty(specialty);
        let mut appointments = self.appointments_chronological();
        appointments.retain(|a| badges.contains(&a.doctor_id));
        appointments
    }

    pub fn doctor_schedule(&self, badge_id: u32) -> Result<ScheduleSnapshot, AppointmentError> {
        Ok(self.doctor_handle(badge_id)?.lock().export_schedule())
    }

    pub fn render_schedule(&self, badge_id: u32) -> Result<String, AppointmentError> {
        Ok(self.doctor_handle(badge_id)?.lock().to_string())
    }

    fn doctor_handle(&self, badge_id: u32) -> Result<Arc<Mutex<Doctor>>, AppointmentError> {
        self.doctors
            .read()
            .get(&badge_id)
            .cloned()
            .ok_or(AppointmentError::DoctorNotFound(badge_id))
    }
}

fn find_booking(
    appointments: &[Appointment],
    appointment: &Appointment,
    scheduled_at: NaiveDateTime,
) -> Option<usize> {
    appointments.iter().position(|a| {
        a.doctor_id == appointment.doctor_id
            && a.patient == appointment.patient
            && a.reason == appointment.reason
            && a.scheduled_at().ok() == Some(scheduled_at)
    })
}
