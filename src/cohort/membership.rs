//! Cohort membership manager.
//!
//! Anonymous ids are `P` + zero-padded sequence. The next sequence is one
//! past the highest id in the project. Uniqueness is enforced by the store;
//! a conflicting insert re-reads the ids and retries.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::error::CohortError;
use super::projects::require_owned_project;
use super::types::CohortPatient;
use crate::config::{
    ANONYMOUS_ID_PREFIX, ANONYMOUS_ID_WIDTH, DEFAULT_GROUP_NAME, MEMBERSHIP_INSERT_ATTEMPTS,
};
use crate::db::{DatabaseError, RecordStore};
use crate::models::enums::MembershipStatus;
use crate::models::CohortMembership;

const UNKNOWN_PATIENT: &str = "Unknown patient";

pub fn anonymous_id(sequence: u32) -> String {
    format!("{ANONYMOUS_ID_PREFIX}{sequence:0width$}", width = ANONYMOUS_ID_WIDTH)
}

fn sequence_of(anonymous_id: &str) -> Option<u32> {
    anonymous_id.strip_prefix(ANONYMOUS_ID_PREFIX)?.parse().ok()
}

/// One past the highest sequence held in the project; ids that do not
/// follow the `P###` format are ignored.
fn next_sequence<S: RecordStore + ?Sized>(store: &S, project_id: &Uuid) -> Result<u32, DatabaseError> {
    let highest = store
        .list_anonymous_ids(project_id)?
        .iter()
        .filter_map(|id| sequence_of(id))
        .max()
        .unwrap_or(0);
    Ok(highest.saturating_add(1))
}

fn group_or_default(group_name: Option<&str>) -> String {
    group_name
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GROUP_NAME)
        .to_string()
}

/// Add a patient to a project's cohort, or move an existing member to
/// `group_name`. The anonymous id of an existing member never changes.
pub fn add_patient<S: RecordStore + ?Sized>(
    store: &S,
    owner: &Uuid,
    project_id: &Uuid,
    patient_id: &Uuid,
    group_name: Option<&str>,
    now: NaiveDateTime,
) -> Result<CohortMembership, CohortError> {
    require_owned_project(store, owner, project_id)?;
    if store.fetch_patients_by_ids(&[*patient_id])?.is_empty() {
        return Err(CohortError::PatientNotFound);
    }
    let group = group_or_default(group_name);

    for attempt in 0..MEMBERSHIP_INSERT_ATTEMPTS {
        if let Some(mut existing) = store.find_membership(project_id, patient_id)? {
            if existing.group_name != group {
                store.update_membership_group(&existing.id, &group)?;
                tracing::info!(
                    project_id = %project_id,
                    anonymous_id = %existing.anonymous_id,
                    group = %group,
                    "Cohort member moved to group"
                );
                existing.group_name = group;
            }
            return Ok(existing);
        }

        let sequence = next_sequence(store, project_id)?;
        let membership = CohortMembership {
            id: Uuid::new_v4(),
            project_id: *project_id,
            patient_id: *patient_id,
            anonymous_id: anonymous_id(sequence),
            group_name: group.clone(),
            status: MembershipStatus::Included,
            inclusion_date: now,
        };

        match store.insert_membership(&membership) {
            Ok(()) => {
                tracing::info!(
                    project_id = %project_id,
                    anonymous_id = %membership.anonymous_id,
                    "Patient added to cohort"
                );
                return Ok(membership);
            }
            Err(DatabaseError::ConstraintViolation(reason)) => {
                tracing::debug!(attempt, reason = %reason, "Membership insert conflicted, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::warn!(project_id = %project_id, "Gave up assigning an anonymous id");
    Err(CohortError::AnonymousIdExhausted {
        attempts: MEMBERSHIP_INSERT_ATTEMPTS,
    })
}

/// Remove a patient from the cohort. Returns whether a row was deleted;
/// removing a non-member is not an error.
pub fn remove_patient<S: RecordStore + ?Sized>(
    store: &S,
    owner: &Uuid,
    project_id: &Uuid,
    patient_id: &Uuid,
) -> Result<bool, CohortError> {
    require_owned_project(store, owner, project_id)?;
    let removed = store.delete_membership(project_id, patient_id)? > 0;
    if removed {
        tracing::info!(project_id = %project_id, "Patient removed from cohort");
    }
    Ok(removed)
}

/// Included members ordered by inclusion date, with display name and age.
pub fn list_patients<S: RecordStore + ?Sized>(
    store: &S,
    owner: &Uuid,
    project_id: &Uuid,
    today: NaiveDate,
) -> Result<Vec<CohortPatient>, CohortError> {
    require_owned_project(store, owner, project_id)?;
    let memberships = store.list_included_memberships(project_id)?;
    if memberships.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = memberships.iter().map(|m| m.patient_id).collect();
    let patients = store.fetch_patients_by_ids(&ids)?;

    Ok(memberships
        .into_iter()
        .map(|m| {
            let patient = patients.iter().find(|p| p.id == m.patient_id);
            CohortPatient {
                membership_id: m.id,
                patient_id: m.patient_id,
                anonymous_id: m.anonymous_id,
                group_name: m.group_name,
                status: m.status,
                inclusion_date: m.inclusion_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
                patient_name: patient
                    .map(|p| p.display_name())
                    .unwrap_or_else(|| UNKNOWN_PATIENT.to_string()),
                age: patient.and_then(|p| p.age_on(today)),
            }
        })
        .collect())
}
