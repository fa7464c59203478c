//! Patient enrichment pipeline.
//!
//! Bounded base fetch, then one bounded fetch per required source restricted
//! to the candidate ids, merged in memory. Source fetches run sequentially.

use std::collections::HashMap;

use uuid::Uuid;

use super::error::CohortError;
use super::types::EnrichedPatient;
use crate::config::FetchLimits;
use crate::db::{DatabaseError, RecordStore};
use crate::models::enums::RecordSource;

/// Enriched base set plus the sources that could not be merged.
#[derive(Debug)]
pub struct Enrichment {
    pub patients: Vec<EnrichedPatient>,
    pub failed_sources: Vec<RecordSource>,
}

/// Fetch the base set and attach `sources` (already in fetch order).
///
/// Only a base fetch failure is an error; a failing source is logged and
/// left unmerged.
pub fn enrich<S: RecordStore + ?Sized>(
    store: &S,
    sources: &[RecordSource],
    limits: &FetchLimits,
) -> Result<Enrichment, CohortError> {
    let base = store.fetch_patients(limits.patients)?;
    tracing::info!(count = base.len(), "Fetched base patient set");

    let mut patients: Vec<EnrichedPatient> = base.into_iter().map(EnrichedPatient::bare).collect();
    let mut failed_sources = Vec::new();
    if patients.is_empty() || sources.is_empty() {
        return Ok(Enrichment { patients, failed_sources });
    }

    let ids: Vec<Uuid> = patients.iter().map(EnrichedPatient::id).collect();
    for &source in sources {
        match merge_source(store, source, &ids, limits, &mut patients) {
            Ok(rows) => {
                tracing::debug!(source = %source, rows, "Merged record source");
            }
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "Record source fetch failed, leaving unmerged");
                failed_sources.push(source);
            }
        }
    }

    Ok(Enrichment { patients, failed_sources })
}

/// Fetch one source and splice it onto every patient. Returns rows fetched.
fn merge_source<S: RecordStore + ?Sized>(
    store: &S,
    source: RecordSource,
    ids: &[Uuid],
    limits: &FetchLimits,
    patients: &mut [EnrichedPatient],
) -> Result<usize, DatabaseError> {
    let rows = match source {
        RecordSource::Consultations => {
            let rows = store.fetch_consultations(ids, limits.consultations)?;
            let count = rows.len();
            let mut latest = latest_by(rows, |c| c.patient_id, |c| c.consultation_date);
            for p in patients.iter_mut() {
                p.latest_consultation = latest.remove(&p.id());
            }
            count
        }
        RecordSource::Treatments => {
            let rows = store.fetch_treatments(ids, limits.treatments)?;
            let count = rows.len();
            let mut grouped = group_newest_first(rows, |t| t.patient_id, |t| t.created_at);
            for p in patients.iter_mut() {
                p.treatments = grouped.remove(&p.id()).unwrap_or_default();
            }
            count
        }
        RecordSource::ToothDiagnoses => {
            let rows = store.fetch_tooth_diagnoses(ids, limits.tooth_diagnoses)?;
            let count = rows.len();
            let mut grouped = group_newest_first(rows, |t| t.patient_id, |t| t.created_at);
            for p in patients.iter_mut() {
                p.tooth_diagnoses = grouped.remove(&p.id()).unwrap_or_default();
            }
            count
        }
        RecordSource::Appointments => {
            let rows = store.fetch_appointments(ids, limits.appointments)?;
            let count = rows.len();
            let mut latest = latest_by(rows, |a| a.patient_id, |a| a.appointment_date);
            for p in patients.iter_mut() {
                p.latest_appointment = latest.remove(&p.id());
            }
            count
        }
    };

    for p in patients.iter_mut() {
        p.merged.insert(source);
    }
    Ok(rows)
}

/// Latest row per patient. On equal keys the earlier row wins.
fn latest_by<T, K: Ord>(
    rows: Vec<T>,
    patient_of: impl Fn(&T) -> Uuid,
    key: impl Fn(&T) -> K,
) -> HashMap<Uuid, T> {
    let mut latest: HashMap<Uuid, T> = HashMap::new();
    for row in rows {
        let pid = patient_of(&row);
        let newer = latest.get(&pid).map_or(true, |current| key(&row) > key(current));
        if newer {
            latest.insert(pid, row);
        }
    }
    latest
}

/// All rows per patient, newest first. Stable for equal keys.
fn group_newest_first<T, K: Ord>(
    rows: Vec<T>,
    patient_of: impl Fn(&T) -> Uuid,
    key: impl Fn(&T) -> K,
) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(patient_of(&row)).or_default().push(row);
    }
    for rows in grouped.values_mut() {
        rows.sort_by(|a, b| key(b).cmp(&key(a)));
    }
    grouped
}
