use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use super::{format_timestamp, id_placeholders, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::lenient::parse_date;
use crate::models::*;

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, date_of_birth, gender, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.date_of_birth.map(|d| d.to_string()),
            patient.gender,
            format_timestamp(&patient.created_at),
        ],
    )?;
    Ok(())
}

/// Newest patients first, bounded by `limit`.
pub fn fetch_patients(conn: &Connection, limit: usize) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, date_of_birth, gender, created_at
         FROM patients
         ORDER BY created_at DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], patient_row)?;
    patient_rows_to_vec(rows)
}

pub fn fetch_patients_by_ids(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Patient>, DatabaseError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let sql = format!(
        "SELECT id, first_name, last_name, date_of_birth, gender, created_at
         FROM patients WHERE id IN ({})",
        id_placeholders(ids.len(), 1)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids.iter().map(Uuid::to_string)), patient_row)?;
    patient_rows_to_vec(rows)
}

type PatientRow = (String, String, String, Option<String>, Option<String>, String);

fn patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn patient_rows_to_vec(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<PatientRow>>,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut patients = Vec::new();
    for row in rows {
        let (id, first_name, last_name, dob, gender, created_at) = row?;
        patients.push(Patient {
            id: parse_uuid(&id)?,
            first_name,
            last_name,
            date_of_birth: dob.as_deref().and_then(parse_date),
            gender,
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(patients)
}
