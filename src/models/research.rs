use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MembershipStatus, ProjectStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchProject {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One patient's enrollment in a project's cohort.
///
/// `anonymous_id` is assigned at first insertion and never rewritten;
/// re-adding a patient only changes `group_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortMembership {
    pub id: Uuid,
    pub project_id: Uuid,
    pub patient_id: Uuid,
    pub anonymous_id: String,
    pub group_name: String,
    pub status: MembershipStatus,
    pub inclusion_date: NaiveDateTime,
}
