//! Field accessors: resolve one optional value from an enriched patient.
//!
//! A missing intermediate node (no consultation, no diagnosis section, ...)
//! resolves to `None`, except for flags, which resolve to `false`.

use super::comparators::FieldValue;
use super::types::{EnrichedPatient, EvalContext};
use crate::models::*;

pub type Accessor = fn(&EnrichedPatient, &EvalContext) -> Option<FieldValue>;

fn text(value: Option<&String>) -> Option<FieldValue> {
    value.map(|s| FieldValue::Text(s.clone()))
}

fn number(value: Option<f64>) -> Option<FieldValue> {
    value.map(FieldValue::Number)
}

/// Flags compare by truthiness; an absent flag is falsy.
fn flag(value: Option<bool>) -> Option<FieldValue> {
    Some(FieldValue::Flag(value.unwrap_or(false)))
}

fn list<I: IntoIterator<Item = String>>(items: I) -> Option<FieldValue> {
    Some(FieldValue::TextList(items.into_iter().collect()))
}

/// Display names joined into one lowercase string for substring tests.
fn joined_diagnoses(entries: &[DiagnosisEntry]) -> Option<FieldValue> {
    let names: Vec<String> = entries.iter().filter_map(DiagnosisEntry::display_name).collect();
    if names.is_empty() {
        return None;
    }
    Some(FieldValue::Text(names.join(", ").to_lowercase()))
}

fn clinical(p: &EnrichedPatient) -> Option<&ClinicalData> {
    p.clinical_data()
}

fn pain(p: &EnrichedPatient) -> Option<&PainAssessment> {
    clinical(p)?.pain_assessment.as_ref()
}

fn diagnosis(p: &EnrichedPatient) -> Option<&DiagnosisSection> {
    clinical(p)?.diagnosis.as_ref()
}

fn plan(p: &EnrichedPatient) -> Option<&TreatmentPlan> {
    clinical(p)?.treatment_plan.as_ref()
}

fn examination(p: &EnrichedPatient) -> Option<&ClinicalExamination> {
    clinical(p)?.clinical_examination.as_ref()
}

fn history(p: &EnrichedPatient) -> Option<&MedicalHistory> {
    clinical(p)?.medical_history.as_ref()
}

fn follow_up(p: &EnrichedPatient) -> Option<&FollowUp> {
    clinical(p)?.follow_up_data.as_ref()
}

// ── Demographic ─────────────────────────────────────────

pub fn age(p: &EnrichedPatient, ctx: &EvalContext) -> Option<FieldValue> {
    number(p.patient.age_on(ctx.today).map(f64::from))
}

pub fn first_name(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(Some(&p.patient.first_name))
}

pub fn last_name(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(Some(&p.patient.last_name))
}

pub fn gender(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(p.patient.gender.as_ref())
}

// ── Consultation: pain ──────────────────────────────────

pub fn pain_intensity(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    number(pain(p)?.intensity)
}

pub fn pain_location(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(pain(p)?.location.as_ref())
}

pub fn pain_duration(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(pain(p)?.duration.as_ref())
}

pub fn pain_character(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(pain(p)?.character.as_ref())
}

pub fn pain_triggers(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(pain(p)?.triggers.iter().cloned())
}

// ── Consultation: diagnosis ─────────────────────────────

pub fn diagnosis_primary(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(diagnosis(p)?.primary.as_ref())
}

pub fn diagnosis_secondary(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(diagnosis(p)?.secondary.as_ref())
}

pub fn diagnosis_provisional(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    joined_diagnoses(&diagnosis(p)?.provisional)
}

pub fn diagnosis_differential(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    joined_diagnoses(&diagnosis(p)?.differential)
}

pub fn diagnosis_final(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    joined_diagnoses(&diagnosis(p)?.final_)
}

pub fn icd_code(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(diagnosis(p)?.icd_codes())
}

// ── Consultation: treatment plan ────────────────────────

pub fn treatment_plan_procedure(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(plan(p)?.procedure.as_ref())
}

pub fn treatment_plan_complexity(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(plan(p)?.complexity.as_ref())
}

pub fn treatment_plan_teeth(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(plan(p)?.tooth_numbers.iter().cloned())
}

pub fn treatment_plan_duration(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    number(plan(p)?.estimated_duration)
}

pub fn treatment_plan_items(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(plan(p)?.plan.iter().cloned())
}

pub fn prognosis(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(plan(p)?.prognosis.as_ref())
}

// ── Consultation: examination ───────────────────────────

pub fn periodontal_pocket_depth(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    number(examination(p)?.periodontal.as_ref()?.max_pocket_depth)
}

pub fn bleeding_on_probing(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    flag(
        examination(p)
            .and_then(|e| e.periodontal.as_ref())
            .and_then(|pd| pd.bleeding_on_probing),
    )
}

pub fn tooth_mobility(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(examination(p)?.mobility.as_ref()?.grade.as_ref())
}

pub fn soft_tissue_findings(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(examination(p)?.soft_tissue.as_ref())
}

// ── Consultation: history, investigations, prescriptions ─

pub fn medical_conditions(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(history(p)?.conditions.iter().cloned())
}

pub fn current_medications(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(history(p)?.medications.iter().cloned())
}

pub fn allergies(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(history(p)?.allergies.iter().cloned())
}

pub fn investigation_type(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(clinical(p)?.investigations.iter().filter_map(|i| i.kind.clone()))
}

pub fn investigation_findings(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(clinical(p)?.investigations.iter().filter_map(|i| i.findings.clone()))
}

pub fn prescribed_medication(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(
        clinical(p)?
            .prescription_data
            .iter()
            .filter_map(|rx| rx.medication_name.clone()),
    )
}

pub fn prescription_count(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    number(Some(clinical(p)?.prescription_data.len() as f64))
}

// ── Consultation: follow-up and metadata ────────────────

pub fn follow_up_required(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    flag(follow_up(p).and_then(|f| f.required))
}

pub fn follow_up_date(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    follow_up(p)?.follow_up_date.map(FieldValue::Date)
}

pub fn follow_up_interval(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    number(follow_up(p)?.interval_days)
}

pub fn consultation_date(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    p.latest_consultation
        .as_ref()
        .map(|c| FieldValue::Date(c.consultation_date))
}

pub fn consultation_status(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(p.latest_consultation.as_ref()?.status.as_ref())
}

// ── Treatments ──────────────────────────────────────────

pub fn treatment_type(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(p.treatments.iter().map(|t| t.treatment_type.clone()))
}

pub fn treatment_status(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(p.treatments.iter().filter_map(|t| t.status.clone()))
}

pub fn treatment_outcome(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(p.treatments.iter().filter_map(|t| t.outcome.clone()))
}

pub fn treatment_completion_date(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    Some(FieldValue::DateList(
        p.treatments.iter().filter_map(|t| t.completion_date).collect(),
    ))
}

pub fn treatment_count(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    number(Some(p.treatment_count() as f64))
}

// ── Tooth diagnoses ─────────────────────────────────────

pub fn tooth_number(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(p.tooth_diagnoses.iter().map(|t| t.tooth_number.to_string()))
}

pub fn tooth_diagnosis(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(p.tooth_diagnoses.iter().filter_map(|t| t.primary_diagnosis.clone()))
}

pub fn tooth_treatment(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(p.tooth_diagnoses.iter().filter_map(|t| t.recommended_treatment.clone()))
}

pub fn tooth_priority(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(p.tooth_diagnoses.iter().filter_map(|t| t.priority.clone()))
}

pub fn tooth_status(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    list(p.tooth_diagnoses.iter().filter_map(|t| t.status.clone()))
}

pub fn affected_teeth_count(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    number(Some(p.affected_teeth_count() as f64))
}

// ── Appointments ────────────────────────────────────────

pub fn appointment_status(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    text(p.latest_appointment.as_ref()?.status.as_ref())
}

pub fn last_visit(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    p.latest_appointment
        .as_ref()
        .map(|a| FieldValue::Date(a.appointment_date))
}

pub fn satisfaction_rating(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    number(p.latest_appointment.as_ref()?.satisfaction_rating)
}

pub fn attended(p: &EnrichedPatient, _: &EvalContext) -> Option<FieldValue> {
    flag(p.latest_appointment.as_ref().and_then(|a| a.attended))
}
