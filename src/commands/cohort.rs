//! Cohort commands.
//!
//! Four commands:
//! - `find_matching_patients`: filter and score patients by criteria
//! - `add_patient_to_cohort`: add or regroup a member
//! - `remove_patient_from_cohort`: drop a member
//! - `get_cohort_patients`: list included members

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::cohort::{self, membership, CohortPatient, MatchResult};
use crate::core_state::CoreState;
use crate::models::FilterCriterion;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindPatientsResponse {
    pub patients: Vec<MatchResult>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPatientResponse {
    pub anonymous_id: String,
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovePatientResponse {
    pub removed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortPatientsResponse {
    pub patients: Vec<CohortPatient>,
}

/// Filter patients. Infrastructure failures degrade to fewer (or no)
/// results; only a missing session is an error.
pub fn find_matching_patients(
    state: &CoreState,
    criteria: Vec<FilterCriterion>,
) -> Result<FindPatientsResponse, String> {
    state.require_user().map_err(|e| e.to_string())?;

    let store = match state.open_store() {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Record store unavailable, returning no matches");
            return Ok(FindPatientsResponse { patients: Vec::new(), count: 0 });
        }
    };

    let report = cohort::find_matching_patients(
        &store,
        &criteria,
        &state.engine,
        Local::now().date_naive(),
    );
    Ok(FindPatientsResponse {
        count: report.count(),
        patients: report.patients,
    })
}

pub fn add_patient_to_cohort(
    state: &CoreState,
    project_id: String,
    patient_id: String,
    group_name: Option<String>,
) -> Result<AddPatientResponse, String> {
    let user = state.require_user().map_err(|e| e.to_string())?;
    let project_id = parse_id(&project_id, "project")?;
    let patient_id = parse_id(&patient_id, "patient")?;
    let store = state.open_store().map_err(|e| e.to_string())?;

    let member = membership::add_patient(
        &store,
        &user,
        &project_id,
        &patient_id,
        group_name.as_deref(),
        Local::now().naive_local(),
    )
    .map_err(|e| e.to_string())?;

    Ok(AddPatientResponse {
        anonymous_id: member.anonymous_id,
        group_name: member.group_name,
    })
}

pub fn remove_patient_from_cohort(
    state: &CoreState,
    project_id: String,
    patient_id: String,
) -> Result<RemovePatientResponse, String> {
    let user = state.require_user().map_err(|e| e.to_string())?;
    let project_id = parse_id(&project_id, "project")?;
    let patient_id = parse_id(&patient_id, "patient")?;
    let store = state.open_store().map_err(|e| e.to_string())?;

    let removed = membership::remove_patient(&store, &user, &project_id, &patient_id)
        .map_err(|e| e.to_string())?;
    Ok(RemovePatientResponse { removed })
}

pub fn get_cohort_patients(
    state: &CoreState,
    project_id: String,
) -> Result<CohortPatientsResponse, String> {
    let user = state.require_user().map_err(|e| e.to_string())?;
    let project_id = parse_id(&project_id, "project")?;
    let store = state.open_store().map_err(|e| e.to_string())?;

    let patients = membership::list_patients(&store, &user, &project_id, Local::now().date_naive())
        .map_err(|e| e.to_string())?;
    Ok(CohortPatientsResponse { patients })
}
