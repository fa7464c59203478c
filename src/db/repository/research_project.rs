use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::ProjectStatus;
use crate::models::*;

pub fn insert_research_project(conn: &Connection, project: &ResearchProject) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO research_projects (id, owner_id, title, description, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            project.id.to_string(),
            project.owner_id.to_string(),
            project.title,
            project.description,
            project.status.as_str(),
            format_timestamp(&project.created_at),
            format_timestamp(&project.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_research_project(conn: &Connection, id: &Uuid) -> Result<Option<ResearchProject>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, title, description, status, created_at, updated_at
         FROM research_projects WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![id.to_string()], project_row);

    match result {
        Ok(row) => Ok(Some(project_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_research_projects_for_owner(
    conn: &Connection,
    owner_id: &Uuid,
) -> Result<Vec<ResearchProject>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, title, description, status, created_at, updated_at
         FROM research_projects WHERE owner_id = ?1
         ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![owner_id.to_string()], project_row)?;

    let mut projects = Vec::new();
    for row in rows {
        projects.push(project_from_row(row?)?);
    }
    Ok(projects)
}

/// Any status may follow any other; there is no transition graph.
pub fn update_research_project_status(
    conn: &Connection,
    id: &Uuid,
    status: ProjectStatus,
    updated_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE research_projects SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), format_timestamp(updated_at), id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "research_project".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct ProjectRow {
    id: String,
    owner_id: String,
    title: String,
    description: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

fn project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn project_from_row(row: ProjectRow) -> Result<ResearchProject, DatabaseError> {
    Ok(ResearchProject {
        id: parse_uuid(&row.id)?,
        owner_id: parse_uuid(&row.owner_id)?,
        title: row.title,
        description: row.description,
        status: ProjectStatus::from_str(&row.status)?,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}
