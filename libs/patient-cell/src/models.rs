use serde::{Deserialize, Serialize};

/// Patient identity and history. Plain data; scheduling never inspects it
/// beyond the name and id used to label a booked slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Patient {
    pub name: String,
    pub patient_id: u32,
    pub age: u32,
    pub contact_info: String,
    pub medical_history: String,
}

impl Patient {
    pub fn new(
        name: impl Into<String>,
        patient_id: u32,
        age: u32,
        contact_info: impl Into<String>,
        medical_history: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            patient_id,
            age,
            contact_info: contact_info.into(),
            medical_history: medical_history.into(),
        }
    }
}
