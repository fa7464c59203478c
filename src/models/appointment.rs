use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    pub status: Option<String>,
    pub satisfaction_rating: Option<f64>,
    pub attended: Option<bool>,
}
