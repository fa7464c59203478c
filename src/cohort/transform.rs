//! Deduplication and projection into the public result shape.

use std::collections::HashSet;

use super::scoring::match_score;
use super::types::{EnrichedPatient, EvalContext, MatchResult};
use crate::models::DiagnosisEntry;
use crate::models::FilterCriterion;

const NOT_SPECIFIED: &str = "Not specified";

/// One row per patient id, first occurrence wins, order preserved.
pub fn dedup(patients: Vec<EnrichedPatient>) -> Vec<EnrichedPatient> {
    let mut seen = HashSet::new();
    patients.into_iter().filter(|p| seen.insert(p.id())).collect()
}

pub fn to_results(
    patients: Vec<EnrichedPatient>,
    criteria: &[FilterCriterion],
    ctx: &EvalContext,
) -> Vec<MatchResult> {
    dedup(patients)
        .iter()
        .map(|p| to_result(p, criteria, ctx))
        .collect()
}

pub fn to_result(patient: &EnrichedPatient, criteria: &[FilterCriterion], ctx: &EvalContext) -> MatchResult {
    MatchResult {
        id: patient.id(),
        first_name: patient.patient.first_name.clone(),
        last_name: patient.patient.last_name.clone(),
        age: patient.patient.age_on(ctx.today),
        gender: patient.patient.gender.clone(),
        last_visit: last_visit(patient),
        condition: condition(patient),
        treatment_type: treatment_type(patient),
        match_score: match_score(patient, criteria, ctx),
    }
}

/// Latest appointment date, else the patient's creation timestamp.
fn last_visit(patient: &EnrichedPatient) -> String {
    match &patient.latest_appointment {
        Some(appt) => appt.appointment_date.format("%Y-%m-%d").to_string(),
        None => patient.patient.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
    }
}

fn condition(patient: &EnrichedPatient) -> String {
    let dx = patient.clinical_data().and_then(|c| c.diagnosis.as_ref());
    let first_name = |entries: &[DiagnosisEntry]| entries.iter().find_map(DiagnosisEntry::display_name);

    dx.and_then(|d| first_name(&d.final_))
        .or_else(|| dx.and_then(|d| d.primary.clone()))
        .or_else(|| dx.and_then(|d| first_name(&d.provisional)))
        .or_else(|| {
            patient
                .tooth_diagnoses
                .first()
                .and_then(|t| t.primary_diagnosis.clone())
        })
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

fn treatment_type(patient: &EnrichedPatient) -> Option<String> {
    patient
        .latest_treatment()
        .map(|t| t.treatment_type.clone())
        .or_else(|| {
            patient
                .clinical_data()
                .and_then(|c| c.treatment_plan.as_ref())
                .and_then(|plan| plan.procedure.clone())
        })
}
