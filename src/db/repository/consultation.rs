use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use super::{id_placeholders, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_consultation(conn: &Connection, consultation: &Consultation) -> Result<(), DatabaseError> {
    let clinical_json = serde_json::to_string(&consultation.clinical_data)?;
    insert_consultation_raw(
        conn,
        &consultation.id,
        &consultation.patient_id,
        &consultation.consultation_date,
        consultation.status.as_deref(),
        &clinical_json,
    )
}

/// Insert with the clinical document stored verbatim (may be malformed).
pub fn insert_consultation_raw(
    conn: &Connection,
    id: &Uuid,
    patient_id: &Uuid,
    date: &NaiveDate,
    status: Option<&str>,
    clinical_json: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO consultations (id, patient_id, consultation_date, status, clinical_data)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.to_string(),
            patient_id.to_string(),
            date.to_string(),
            status,
            clinical_json,
        ],
    )?;
    Ok(())
}

/// Consultations of the given patients, most recent first.
pub fn fetch_consultations_for(
    conn: &Connection,
    patient_ids: &[Uuid],
    limit: usize,
) -> Result<Vec<Consultation>, DatabaseError> {
    if patient_ids.is_empty() {
        return Ok(vec![]);
    }
    let sql = format!(
        "SELECT id, patient_id, consultation_date, status, clinical_data
         FROM consultations
         WHERE patient_id IN ({})
         ORDER BY consultation_date DESC
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
        ))
    })?;

    let mut consultations = Vec::new();
    for row in rows {
        let (id, patient_id, date, status, clinical_data) = row?;
        let consultation_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
        consultations.push(Consultation {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            consultation_date,
            status,
            clinical_data: clinical_data
                .as_deref()
                .map(ClinicalData::parse)
                .unwrap_or_default(),
        });
    }
    Ok(consultations)
}
