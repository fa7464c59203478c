//! Research project registry scoped to the owning user.

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::error::CohortError;
use crate::db::RecordStore;
use crate::models::enums::ProjectStatus;
use crate::models::ResearchProject;

const MAX_TITLE_LEN: usize = 300;

/// Project owned by `owner`. Other owners' projects look absent.
pub fn require_owned_project<S: RecordStore + ?Sized>(
    store: &S,
    owner: &Uuid,
    project_id: &Uuid,
) -> Result<ResearchProject, CohortError> {
    match store.get_project(project_id)? {
        Some(project) if project.owner_id == *owner => Ok(project),
        _ => Err(CohortError::ProjectNotFound),
    }
}

/// New project in `draft`.
pub fn create_project<S: RecordStore + ?Sized>(
    store: &S,
    owner: &Uuid,
    title: &str,
    description: Option<&str>,
    now: NaiveDateTime,
) -> Result<ResearchProject, CohortError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CohortError::InvalidInput("Project title is required".into()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(CohortError::InvalidInput("Project title too long".into()));
    }

    let project = ResearchProject {
        id: Uuid::new_v4(),
        owner_id: *owner,
        title: title.to_string(),
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from),
        status: ProjectStatus::Draft,
        created_at: now,
        updated_at: now,
    };
    store.insert_project(&project)?;
    tracing::info!(project_id = %project.id, "Research project created");
    Ok(project)
}

pub fn get_project<S: RecordStore + ?Sized>(
    store: &S,
    owner: &Uuid,
    project_id: &Uuid,
) -> Result<ResearchProject, CohortError> {
    require_owned_project(store, owner, project_id)
}

/// Owner's projects, newest first.
pub fn list_projects<S: RecordStore + ?Sized>(
    store: &S,
    owner: &Uuid,
) -> Result<Vec<ResearchProject>, CohortError> {
    Ok(store.list_projects(owner)?)
}

/// Any status may be set from any other.
pub fn set_project_status<S: RecordStore + ?Sized>(
    store: &S,
    owner: &Uuid,
    project_id: &Uuid,
    status: ProjectStatus,
    now: NaiveDateTime,
) -> Result<ResearchProject, CohortError> {
    let mut project = require_owned_project(store, owner, project_id)?;
    store.update_project_status(project_id, status, &now)?;
    tracing::info!(project_id = %project_id, status = %status, "Research project status updated");
    project.status = status;
    project.updated_at = now;
    Ok(project)
}
