use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clinical_data::ClinicalData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub consultation_date: NaiveDate,
    pub status: Option<String>,
    pub clinical_data: ClinicalData,
}
