use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use super::{id_placeholders, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, appointment_date, status, satisfaction_rating, attended)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.appointment_date.to_string(),
            appt.status,
            appt.satisfaction_rating,
            appt.attended.map(|a| a as i32),
        ],
    )?;
    Ok(())
}

/// Appointments of the given patients, most recent first.
pub fn fetch_appointments_for(
    conn: &Connection,
    patient_ids: &[Uuid],
    limit: usize,
) -> Result<Vec<Appointment>, DatabaseError> {
    if patient_ids.is_empty() {
        return Ok(vec![]);
    }
    let sql = format!(
        "SELECT id, patient_id, appointment_date, status, satisfaction_rating, attended
         FROM appointments
         WHERE patient_id IN ({})
         ORDER BY appointment_date DESC
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
            row.get::<_, Option<f64>>(4)?,
            row.get::<_, Option<i32>>(5)?,
        ))
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        let (id, patient_id, date, status, rating, attended) = row?;
        appointments.push(Appointment {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            appointment_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            status,
            satisfaction_rating: rating,
            attended: attended.map(|a| a != 0),
        });
    }
    Ok(appointments)
}
