//! Research project commands.

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::cohort::projects;
use crate::core_state::CoreState;
use crate::models::enums::ProjectStatus;
use crate::models::ResearchProject;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectResponse {
    pub project: ResearchProject,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ResearchProject>,
}

pub fn create_research_project(
    state: &CoreState,
    request: CreateProjectRequest,
) -> Result<ResearchProject, String> {
    let user = state.require_user().map_err(|e| e.to_string())?;
    let store = state.open_store().map_err(|e| e.to_string())?;
    projects::create_project(
        &store,
        &user,
        &request.title,
        request.description.as_deref(),
        Local::now().naive_local(),
    )
    .map_err(|e| e.to_string())
}

pub fn get_research_project(
    state: &CoreState,
    project_id: String,
) -> Result<ProjectResponse, String> {
    let user = state.require_user().map_err(|e| e.to_string())?;
    let project_id = parse_id(&project_id, "project")?;
    let store = state.open_store().map_err(|e| e.to_string())?;
    let project = projects::get_project(&store, &user, &project_id).map_err(|e| e.to_string())?;
    Ok(ProjectResponse { project })
}

pub fn list_research_projects(state: &CoreState) -> Result<ProjectListResponse, String> {
    let user = state.require_user().map_err(|e| e.to_string())?;
    let store = state.open_store().map_err(|e| e.to_string())?;
    let projects = projects::list_projects(&store, &user).map_err(|e| e.to_string())?;
    Ok(ProjectListResponse { projects })
}

/// Status arrives as its wire name (`draft`, `active`, `completed`, `paused`).
pub fn update_research_project_status(
    state: &CoreState,
    project_id: String,
    status: String,
) -> Result<ProjectResponse, String> {
    let user = state.require_user().map_err(|e| e.to_string())?;
    let project_id = parse_id(&project_id, "project")?;
    let status: ProjectStatus = status
        .trim()
        .parse()
        .map_err(|_| format!("Invalid project status: {status}"))?;
    let store = state.open_store().map_err(|e| e.to_string())?;

    let project = projects::set_project_status(
        &store,
        &user,
        &project_id,
        status,
        Local::now().naive_local(),
    )
    .map_err(|e| e.to_string())?;
    Ok(ProjectResponse { project })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_state::UserSession;
    use uuid::Uuid;

    fn signed_in(dir: &tempfile::TempDir) -> CoreState {
        let state = CoreState::with_database(dir.path().join("records.db"));
        state.set_session(UserSession::new(Uuid::new_v4(), "Dr. Reis")).unwrap();
        state
    }

    fn request(title: &str) -> CreateProjectRequest {
        CreateProjectRequest { title: title.into(), description: Some("Retrospective".into()) }
    }

    #[test]
    fn create_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let state = signed_in(&dir);
        let created = create_research_project(&state, request("Endo retreatment")).unwrap();
        assert_eq!(created.status, ProjectStatus::Draft);

        let listed = list_research_projects(&state).unwrap();
        assert_eq!(listed.projects.len(), 1);
        assert_eq!(listed.projects[0].id, created.id);
        assert_eq!(get_research_project(&state, created.id.to_string()).unwrap().project, created);
    }

    #[test]
    fn status_accepts_any_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let state = signed_in(&dir);
        let id = create_research_project(&state, request("Implants")).unwrap().id.to_string();

        let updated = update_research_project_status(&state, id.clone(), "completed".into()).unwrap();
        assert_eq!(updated.project.status, ProjectStatus::Completed);
        let updated = update_research_project_status(&state, id.clone(), " active ".into()).unwrap();
        assert_eq!(updated.project.status, ProjectStatus::Active);

        let err = update_research_project_status(&state, id, "archived".into()).unwrap_err();
        assert_eq!(err, "Invalid project status: archived");
    }

    #[test]
    fn blank_title_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let state = signed_in(&dir);
        let err = create_research_project(&state, request("  ")).unwrap_err();
        assert_eq!(err, "Invalid input: Project title is required");
    }

    #[test]
    fn requires_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::with_database(dir.path().join("records.db"));
        assert_eq!(list_research_projects(&state).unwrap_err(), "User not authenticated");
    }
}
