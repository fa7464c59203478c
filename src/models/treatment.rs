use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub treatment_type: String,
    pub status: Option<String>,
    pub outcome: Option<String>,
    pub completion_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}
