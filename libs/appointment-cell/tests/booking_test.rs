use std::sync::atomic::{AtomicUsize, Ordering};

use assert_matches::assert_matches;
use chrono::Weekday;

use appointment_cell::{Appointment, AppointmentError, BookingService};
use doctor_cell::{Doctor, WeeklySchedule};
use patient_cell::Patient;
use shared_models::SchedulingError;
use shared_utils::test_utils::{init_test_tracing, TestConfig};

// 2025-03-10 is a Monday.
const MONDAY: &str = "2025-03-10";

fn setup() -> BookingService {
    init_test_tracing();
    let service = BookingService::new(TestConfig::default().to_scheduling_config());
    service.hire("Jane Smith", 7, "Cardiology").unwrap();
    service.hire("Omar Haddad", 3, "cardiology").unwrap();
    service.hire("Ines Costa", 12, "Dermatology").unwrap();
    service
}

fn patient(id: u32) -> Patient {
    Patient::new(format!("Patient {}", id), id, 40, format!("p{}@example.com", id), "")
}

fn visit(patient_id: u32, doctor_id: u32, time: &str, reason: &str) -> Appointment {
    Appointment::new(patient(patient_id), doctor_id, format!("{}T{}", MONDAY, time), reason)
}

#[test]
fn test_roster() {
    let service = setup();
    assert_eq!(service.doctor_ids(), vec![3, 7, 12]);
    assert_eq!(service.doctors_with_specialty("CARDIOLOGY"), vec![3, 7]);
    assert!(service.doctors_with_specialty("Neurology").is_empty());
}

#[test]
fn test_duplicate_badge_rejected() {
    let service = setup();
    assert_matches!(service.hire("Someone Else", 7, "Oncology"), Err(AppointmentError::DuplicateBadge(7)));
    assert_matches!(
        service.hire("  ", 99, "Oncology"),
        Err(AppointmentError::Scheduling(SchedulingError::InvalidArgument(_)))
    );
    assert_eq!(service.doctor_ids(), vec![3, 7, 12]);
}

#[test]
fn test_book_and_conflict() {
    let service = setup();
    let first = visit(1, 7, "09:00", "checkup");
    let second = visit(2, 7, "09:00", "second opinion");

    assert!(service.book(&first).unwrap());
    assert!(!service.book(&second).unwrap());

    let snapshot = service.doctor_schedule(7).unwrap();
    assert_eq!(snapshot.slot(Weekday::Mon, 9), Some("Patient 1 (#1): checkup"));
    assert_eq!(service.appointments_for_doctor(7), vec![first]);

    // Same hour with another doctor is independent.
    assert!(service.book(&visit(2, 3, "09:00", "second opinion")).unwrap());
}

#[test]
fn test_book_validation_errors() {
    let service = setup();
    assert_matches!(
        service.book(&visit(1, 7, "07:00", "early")),
        Err(AppointmentError::Scheduling(SchedulingError::InvalidHour { hour: 7, .. }))
    );
    assert_matches!(service.book(&visit(1, 99, "09:00", "x")), Err(AppointmentError::DoctorNotFound(99)));
    assert_matches!(
        service.book(&Appointment::new(patient(1), 7, "tomorrow", "x")),
        Err(AppointmentError::InvalidDateTime(_))
    );
    assert!(service.appointments_chronological().is_empty());
}

#[test]
fn test_cancel_only_own_booking() {
    let service = setup();
    let booked = visit(1, 7, "10:00", "checkup");
    let intruder = visit(2, 7, "10:00", "checkup");

    assert!(service.book(&booked).unwrap());
    assert!(!service.cancel(&intruder).unwrap());
    assert!(!service.cancel(&visit(1, 7, "11:00", "checkup")).unwrap());

    assert!(service.cancel(&booked).unwrap());
    assert!(!service.cancel(&booked).unwrap());
    assert_eq!(service.doctor_schedule(7).unwrap().slot(Weekday::Mon, 10), None);
    assert!(service.appointments_for_doctor(7).is_empty());
}

#[test]
fn test_cancel_requires_matching_date() {
    let service = setup();
    let booked = Appointment::new(patient(1), 7, "2025-03-10T09:00", "checkup");
    // Same weekday, hour, patient and reason one week later; never booked.
    let next_week = Appointment::new(patient(1), 7, "2025-03-17T09:00", "checkup");

    assert!(service.book(&booked).unwrap());
    assert!(!service.cancel(&next_week).unwrap());

    assert_eq!(service.appointments_for_doctor(7), vec![booked.clone()]);
    assert_eq!(
        service.doctor_schedule(7).unwrap().slot(Weekday::Mon, 9),
        Some("Patient 1 (#1): checkup")
    );
    assert!(service.cancel(&booked).unwrap());
}

#[test]
fn test_reschedule_moves_booking() {
    let service = setup();
    let original = visit(1, 7, "09:00", "checkup");
    assert!(service.book(&original).unwrap());

    assert!(service.reschedule(&original, "2025-03-12T14:00").unwrap());

    let snapshot = service.doctor_schedule(7).unwrap();
    assert_eq!(snapshot.slot(Weekday::Mon, 9), None);
    assert_eq!(snapshot.slot(Weekday::Wed, 14), Some("Patient 1 (#1): checkup"));

    let records = service.appointments_for_doctor(7);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date_time, "2025-03-12T14:00");

    // The old appointment no longer exists.
    assert!(!service.cancel(&original).unwrap());
    assert!(service.cancel(&records[0]).unwrap());
}

#[test]
fn test_reschedule_same_weekly_slot_updates_date() {
    let service = setup();
    let original = visit(1, 7, "09:00", "checkup");
    assert!(service.book(&original).unwrap());

    assert!(service.reschedule(&original, "2025-03-17T09:00").unwrap());
    assert_eq!(service.appointments_for_doctor(7)[0].date_time, "2025-03-17T09:00");
    assert!(service.doctor_schedule(7).unwrap().slot(Weekday::Mon, 9).is_some());
}

#[test]
fn test_failed_reschedule_keeps_original() {
    let service = setup();
    let original = visit(1, 7, "09:00", "checkup");
    let blocker = visit(2, 7, "10:00", "other");
    assert!(service.book(&original).unwrap());
    assert!(service.book(&blocker).unwrap());
    let before = service.doctor_schedule(7).unwrap();

    assert!(!service.reschedule(&original, format!("{}T10:00", MONDAY)).unwrap());
    assert_matches!(
        service.reschedule(&original, format!("{}T19:00", MONDAY)),
        Err(AppointmentError::Scheduling(SchedulingError::InvalidHour { hour: 19, .. }))
    );
    assert_matches!(service.reschedule(&original, "soon"), Err(AppointmentError::InvalidDateTime(_)));
    assert!(!service.reschedule(&visit(3, 7, "11:00", "ghost"), format!("{}T12:00", MONDAY)).unwrap());

    assert_eq!(service.doctor_schedule(7).unwrap(), before);
    assert_eq!(service.appointments_for_doctor(7), vec![original, blocker]);
}

#[test]
fn test_appointments_for_specialty() {
    let service = setup();
    let skin = Appointment::new(patient(1), 12, "2025-03-10T08:00", "rash");
    let heart_late = Appointment::new(patient(2), 7, "2025-03-11T10:00", "ecg");
    let heart_early = Appointment::new(patient(3), 3, "2025-03-10T15:00", "murmur");
    for a in [&skin, &heart_late, &heart_early] {
        assert!(service.book(a).unwrap());
    }

    assert_eq!(service.appointments_for_specialty("cardiology"), vec![heart_early, heart_late]);
    assert_eq!(service.appointments_for_specialty("Dermatology"), vec![skin]);
    assert!(service.appointments_for_specialty("Neurology").is_empty());
}

#[test]
fn test_book_next_available() {
    let service = BookingService::new(TestConfig::short_day().to_scheduling_config());
    service.hire("Jane Smith", 7, "Cardiology").unwrap();

    assert!(service.book(&visit(1, 7, "09:00", "a")).unwrap());
    assert!(service.book(&visit(2, 7, "10:00", "b")).unwrap());

    let booked = service.book_next_available(&visit(3, 7, "09:00", "c")).unwrap().unwrap();
    assert_eq!(booked.date_time, format!("{}T11:00", MONDAY));

    assert_eq!(service.book_next_available(&visit(4, 7, "09:00", "d")).unwrap(), None);
    assert_matches!(
        service.book_next_available(&visit(4, 7, "12:00", "d")),
        Err(AppointmentError::Scheduling(SchedulingError::InvalidHour { .. }))
    );
    assert_eq!(service.appointments_for_doctor(7).len(), 3);
}

#[test]
fn test_find_available_doctor() {
    let service = setup();
    assert_eq!(service.find_available_doctor("Cardiology", Weekday::Mon, 9), Some(3));

    service.book(&visit(1, 3, "09:00", "x")).unwrap();
    assert_eq!(service.find_available_doctor("Cardiology", Weekday::Mon, 9), Some(7));

    service.book(&visit(2, 7, "09:00", "y")).unwrap();
    assert_eq!(service.find_available_doctor("Cardiology", Weekday::Mon, 9), None);
    assert_eq!(service.find_available_doctor("Cardiology", Weekday::Tue, 9), Some(3));
    assert_eq!(service.find_available_doctor("Cardiology", Weekday::Mon, 20), None);
}

#[test]
fn test_find_available_doctor_respects_individual_hours() {
    let service = setup();
    let evening = Doctor::new("Night Owl", 1, "Cardiology", WeeklySchedule::new(18, 22).unwrap()).unwrap();
    service.register_doctor(evening).unwrap();

    assert_eq!(service.find_available_doctor("Cardiology", Weekday::Mon, 19), Some(1));
    assert_eq!(service.find_available_doctor("Cardiology", Weekday::Mon, 9), Some(3));
}

#[test]
fn test_chronological_listing() {
    let service = setup();
    let late = Appointment::new(patient(1), 7, "2025-03-12T15:00", "late");
    let early = Appointment::new(patient(2), 12, "2025-03-11 08:00", "early");
    let middle = Appointment::new(patient(3), 7, "2025-03-11T13:00:00", "middle");

    for a in [&late, &early, &middle] {
        assert!(service.book(a).unwrap());
    }

    let reasons: Vec<String> = service
        .appointments_chronological()
        .into_iter()
        .map(|a| a.reason)
        .collect();
    assert_eq!(reasons, vec!["early", "middle", "late"]);

    let for_seven: Vec<String> = service.appointments_for_doctor(7).into_iter().map(|a| a.reason).collect();
    assert_eq!(for_seven, vec!["middle", "late"]);
}

#[test]
fn test_render_schedule() {
    let service = setup();
    service.book(&visit(1, 12, "16:00", "mole check")).unwrap();

    let text = service.render_schedule(12).unwrap();
    assert!(text.starts_with("Dr. Ines Costa (badge #12, Dermatology)\n"));
    assert!(text.contains("16:00-17:00: Patient 1 (#1): mole check\n"));
    assert_matches!(service.render_schedule(5), Err(AppointmentError::DoctorNotFound(5)));
}

#[test]
fn test_concurrent_same_slot_has_one_winner() {
    let service = setup();
    let wins = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for id in 0..16 {
            let service = &service;
            let wins = &wins;
            s.spawn(move || {
                if service.book(&visit(id, 7, "11:00", "race")).unwrap() {
                    wins.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert_eq!(service.appointments_for_doctor(7).len(), 1);
    assert!(service.doctor_schedule(7).unwrap().slot(Weekday::Mon, 11).is_some());
}

#[test]
fn test_concurrent_distinct_slots_all_succeed() {
    let service = setup();

    std::thread::scope(|s| {
        for hour in 8..17u32 {
            let service = &service;
            s.spawn(move || {
                let appointment = visit(hour, 7, &format!("{:02}:00", hour), "parallel");
                assert!(service.book(&appointment).unwrap());
            });
        }
    });

    assert!(service.doctor_schedule(7).unwrap().day(Weekday::Mon).unwrap().iter().all(Option::is_some));
}

#[test]
fn test_appointment_serializes() {
    let appointment = visit(1, 7, "09:00", "checkup");
    let json = serde_json::to_value(&appointment).unwrap();
    assert_eq!(json["doctor_id"], 7);
    assert_eq!(json["patient"]["name"], "Patient 1");
    assert_eq!(json["date_time"], "2025-03-10T09:00");
}
