use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Diagnosis for one tooth, keyed by its FDI number (11-48, 51-85).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToothDiagnosis {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub consultation_id: Uuid,
    pub tooth_number: u8,
    pub primary_diagnosis: Option<String>,
    pub recommended_treatment: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub created_at: NaiveDateTime,
}
