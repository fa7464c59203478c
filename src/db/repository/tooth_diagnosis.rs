use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use super::{format_timestamp, id_placeholders, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_tooth_diagnosis(conn: &Connection, tooth: &ToothDiagnosis) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tooth_diagnoses (id, patient_id, consultation_id, tooth_number, primary_diagnosis,
         recommended_treatment, priority, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            tooth.id.to_string(),
            tooth.patient_id.to_string(),
            tooth.consultation_id.to_string(),
            tooth.tooth_number,
            tooth.primary_diagnosis,
            tooth.recommended_treatment,
            tooth.priority,
            tooth.status,
            format_timestamp(&tooth.created_at),
        ],
    )?;
    Ok(())
}

/// Tooth-level diagnoses of the given patients, newest first.
pub fn fetch_tooth_diagnoses_for(
    conn: &Connection,
    patient_ids: &[Uuid],
    limit: usize,
) -> Result<Vec<ToothDiagnosis>, DatabaseError> {
    if patient_ids.is_empty() {
        return Ok(vec![]);
    }
    let sql = format!(
        "SELECT id, patient_id, consultation_id, tooth_number, primary_diagnosis,
                recommended_treatment, priority, status, created_at
         FROM tooth_diagnoses
         WHERE patient_id IN ({})
         ORDER BY created_at DESC
         LIMIT {}",
        id_placeholders(patient_ids.len(), 1),
        limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(patient_ids.iter().map(Uuid::to_string)), |row| {
        Ok(ToothRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            consultation_id: row.get(2)?,
            tooth_number: row.get(3)?,
            primary_diagnosis: row.get(4)?,
            recommended_treatment: row.get(5)?,
            priority: row.get(6)?,
            status: row.get(7)?,
            created_at: row.get(8)?,
        })
    })?;

    let mut teeth = Vec::new();
    for row in rows {
        teeth.push(tooth_from_row(row?)?);
    }
    Ok(teeth)
}

struct ToothRow {
    id: String,
    patient_id: String,
    consultation_id: String,
    tooth_number: i64,
    primary_diagnosis: Option<String>,
    recommended_treatment: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    created_at: String,
}

fn tooth_from_row(row: ToothRow) -> Result<ToothDiagnosis, DatabaseError> {
    let tooth_number = u8::try_from(row.tooth_number).map_err(|_| {
        DatabaseError::ConstraintViolation(format!("Invalid FDI tooth number {}", row.tooth_number))
    })?;
    Ok(ToothDiagnosis {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        consultation_id: parse_uuid(&row.consultation_id)?,
        tooth_number,
        primary_diagnosis: row.primary_diagnosis,
        recommended_treatment: row.recommended_treatment,
        priority: row.priority,
        status: row.status,
        created_at: parse_timestamp(&row.created_at)?,
    })
}
