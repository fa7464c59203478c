use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::MembershipStatus;
use crate::models::*;

const MEMBERSHIP_COLUMNS: &str =
    "id, project_id, patient_id, anonymous_id, group_name, status, inclusion_date";

pub fn get_membership(
    conn: &Connection,
    project_id: &Uuid,
    patient_id: &Uuid,
) -> Result<Option<CohortMembership>, DatabaseError> {
    let sql = format!(
        "SELECT {MEMBERSHIP_COLUMNS} FROM cohort_memberships
         WHERE project_id = ?1 AND patient_id = ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(
        params![project_id.to_string(), patient_id.to_string()],
        membership_row,
    );

    match result {
        Ok(row) => Ok(Some(membership_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Anonymous ids held in a project, any status.
pub fn list_anonymous_ids(conn: &Connection, project_id: &Uuid) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT anonymous_id FROM cohort_memberships WHERE project_id = ?1",
    )?;
    let ids = stmt
        .query_map(params![project_id.to_string()], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

/// Insert a new membership. A clash on (project, patient) or
/// (project, anonymous_id) surfaces as `ConstraintViolation`.
pub fn insert_membership(conn: &Connection, membership: &CohortMembership) -> Result<(), DatabaseError> {
    let result = conn.execute(
        "INSERT INTO cohort_memberships
         (id, project_id, patient_id, anonymous_id, group_name, status, inclusion_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            membership.id.to_string(),
            membership.project_id.to_string(),
            membership.patient_id.to_string(),
            membership.anonymous_id,
            membership.group_name,
            membership.status.as_str(),
            format_timestamp(&membership.inclusion_date),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, msg))
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            Err(DatabaseError::ConstraintViolation(
                msg.unwrap_or_else(|| "unique constraint failed".into()),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn update_membership_group(
    conn: &Connection,
    membership_id: &Uuid,
    group_name: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE cohort_memberships SET group_name = ?1 WHERE id = ?2",
        params![group_name, membership_id.to_string()],
    )?;
    Ok(())
}

/// Returns the number of rows removed (0 when the patient was not a member).
pub fn delete_membership(
    conn: &Connection,
    project_id: &Uuid,
    patient_id: &Uuid,
) -> Result<usize, DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM cohort_memberships WHERE project_id = ?1 AND patient_id = ?2",
        params![project_id.to_string(), patient_id.to_string()],
    )?;
    Ok(removed)
}

/// Included members of a project, earliest inclusion first.
pub fn list_included_memberships(
    conn: &Connection,
    project_id: &Uuid,
) -> Result<Vec<CohortMembership>, DatabaseError> {
    let sql = format!(
        "SELECT {MEMBERSHIP_COLUMNS} FROM cohort_memberships
         WHERE project_id = ?1 AND status = 'included'
         ORDER BY inclusion_date ASC, anonymous_id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![project_id.to_string()], membership_row)?;

    let mut memberships = Vec::new();
    for row in rows {
        memberships.push(membership_from_row(row?)?);
    }
    Ok(memberships)
}

type MembershipRow = (String, String, String, String, String, String, String);

fn membership_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MembershipRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn membership_from_row(row: MembershipRow) -> Result<CohortMembership, DatabaseError> {
    let (id, project_id, patient_id, anonymous_id, group_name, status, inclusion_date) = row;
    Ok(CohortMembership {
        id: parse_uuid(&id)?,
        project_id: parse_uuid(&project_id)?,
        patient_id: parse_uuid(&patient_id)?,
        anonymous_id,
        group_name,
        status: MembershipStatus::from_str(&status)?,
        inclusion_date: parse_timestamp(&inclusion_date)?,
    })
}
