pub mod schedule;
pub mod doctor;

pub use schedule::WeeklySchedule;
pub use doctor::Doctor;
