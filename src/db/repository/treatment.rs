use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use super::{format_timestamp, id_placeholders, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::lenient::parse_date;
use crate::models::*;

pub fn insert_treatment(conn: &Connection, treatment: &Treatment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO treatments (id, patient_id, treatment_type, status, outcome, completion_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            treatment.id.to_string(),
            treatment.patient_id.to_string(),
            treatment.treatment_type,
            treatment.status,
            treatment.outcome,
            treatment.completion_date.map(|d| d.to_string()),
            format_timestamp(&treatment.created_at),
        ],
    )?;
    Ok(())
}

/// Treatments of the given patients, newest first.
pub fn fetch_treatments_for(
    conn: &Connection,
    patient_ids: &[Uuid],
    limit: usize,
) -> Result<Vec<Treatment>, DatabaseError> {
    if patient_ids.is_empty() {
        return Ok(vec![]);
    }
    let sql = format!(
        "SELECT id, patient_id, treatment_type, status, outcome, completion_date, created_at
         FROM treatments
         WHERE patient_id IN ({})
         ORDER BY created_at DESC
         LIMIT {}",
        id_placeholders(patient_ids.len(), 1),
        limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(patient_ids.iter().map(Uuid::to_string)), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut treatments = Vec::new();
    for row in rows {
        let (id, patient_id, treatment_type, status, outcome, completion_date, created_at) = row?;
        treatments.push(Treatment {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            treatment_type,
            status,
            outcome,
            completion_date: completion_date.as_deref().and_then(parse_date),
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(treatments)
}
