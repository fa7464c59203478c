//! Predicate evaluator registry.
//!
//! One entry per filterable field, mapping the field name to the record
//! source it needs and the accessor that resolves it. Built once.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::accessors::{self as acc, Accessor};
use super::comparators::{compare, FieldValue};
use super::types::{EnrichedPatient, EvalContext};
use crate::config::UnknownFieldPolicy;
use crate::models::enums::RecordSource;
use crate::models::FilterCriterion;

/// Registered field: its source (`None` for demographics) and accessor.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub source: Option<RecordSource>,
    accessor: Accessor,
}

impl FieldSpec {
    const fn new(name: &'static str, source: Option<RecordSource>, accessor: Accessor) -> Self {
        Self { name, source, accessor }
    }

    pub fn resolve(&self, patient: &EnrichedPatient, ctx: &EvalContext) -> Option<FieldValue> {
        (self.accessor)(patient, ctx)
    }

    pub fn is_demographic(&self) -> bool {
        self.source.is_none()
    }
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

const DEMOGRAPHIC: Option<RecordSource> = None;
const CONSULTATIONS: Option<RecordSource> = Some(RecordSource::Consultations);
const TREATMENTS: Option<RecordSource> = Some(RecordSource::Treatments);
const TOOTH_DIAGNOSES: Option<RecordSource> = Some(RecordSource::ToothDiagnoses);
const APPOINTMENTS: Option<RecordSource> = Some(RecordSource::Appointments);

static FIELDS: &[FieldSpec] = &[
    FieldSpec::new("age", DEMOGRAPHIC, acc::age),
    FieldSpec::new("first_name", DEMOGRAPHIC, acc::first_name),
    FieldSpec::new("last_name", DEMOGRAPHIC, acc::last_name),
    FieldSpec::new("gender", DEMOGRAPHIC, acc::gender),
    FieldSpec::new("pain_intensity", CONSULTATIONS, acc::pain_intensity),
    FieldSpec::new("pain_location", CONSULTATIONS, acc::pain_location),
    FieldSpec::new("pain_duration", CONSULTATIONS, acc::pain_duration),
    FieldSpec::new("pain_character", CONSULTATIONS, acc::pain_character),
    FieldSpec::new("pain_triggers", CONSULTATIONS, acc::pain_triggers),
    FieldSpec::new("diagnosis_primary", CONSULTATIONS, acc::diagnosis_primary),
    FieldSpec::new("diagnosis_secondary", CONSULTATIONS, acc::diagnosis_secondary),
    FieldSpec::new("diagnosis_provisional", CONSULTATIONS, acc::diagnosis_provisional),
    FieldSpec::new("diagnosis_differential", CONSULTATIONS, acc::diagnosis_differential),
    FieldSpec::new("diagnosis_final", CONSULTATIONS, acc::diagnosis_final),
    FieldSpec::new("icd_code", CONSULTATIONS, acc::icd_code),
    FieldSpec::new("treatment_plan_procedure", CONSULTATIONS, acc::treatment_plan_procedure),
    FieldSpec::new("treatment_plan_complexity", CONSULTATIONS, acc::treatment_plan_complexity),
    FieldSpec::new("treatment_plan_teeth", CONSULTATIONS, acc::treatment_plan_teeth),
    FieldSpec::new("treatment_plan_duration", CONSULTATIONS, acc::treatment_plan_duration),
    FieldSpec::new("treatment_plan_items", CONSULTATIONS, acc::treatment_plan_items),
    FieldSpec::new("prognosis", CONSULTATIONS, acc::prognosis),
    FieldSpec::new("periodontal_pocket_depth", CONSULTATIONS, acc::periodontal_pocket_depth),
    FieldSpec::new("bleeding_on_probing", CONSULTATIONS, acc::bleeding_on_probing),
    FieldSpec::new("tooth_mobility", CONSULTATIONS, acc::tooth_mobility),
    FieldSpec::new("soft_tissue_findings", CONSULTATIONS, acc::soft_tissue_findings),
    FieldSpec::new("medical_conditions", CONSULTATIONS, acc::medical_conditions),
    FieldSpec::new("current_medications", CONSULTATIONS, acc::current_medications),
    FieldSpec::new("allergies", CONSULTATIONS, acc::allergies),
    FieldSpec::new("investigation_type", CONSULTATIONS, acc::investigation_type),
    FieldSpec::new("investigation_findings", CONSULTATIONS, acc::investigation_findings),
    FieldSpec::new("prescribed_medication", CONSULTATIONS, acc::prescribed_medication),
    FieldSpec::new("prescription_count", CONSULTATIONS, acc::prescription_count),
    FieldSpec::new("follow_up_required", CONSULTATIONS, acc::follow_up_required),
    FieldSpec::new("follow_up_date", CONSULTATIONS, acc::follow_up_date),
    FieldSpec::new("follow_up_interval", CONSULTATIONS, acc::follow_up_interval),
    FieldSpec::new("consultation_date", CONSULTATIONS, acc::consultation_date),
    FieldSpec::new("consultation_status", CONSULTATIONS, acc::consultation_status),
    FieldSpec::new("treatment_type", TREATMENTS, acc::treatment_type),
    FieldSpec::new("treatment_status", TREATMENTS, acc::treatment_status),
    FieldSpec::new("treatment_outcome", TREATMENTS, acc::treatment_outcome),
    FieldSpec::new("treatment_completion_date", TREATMENTS, acc::treatment_completion_date),
    FieldSpec::new("treatment_count", TREATMENTS, acc::treatment_count),
    FieldSpec::new("tooth_number", TOOTH_DIAGNOSES, acc::tooth_number),
    FieldSpec::new("tooth_diagnosis", TOOTH_DIAGNOSES, acc::tooth_diagnosis),
    FieldSpec::new("tooth_treatment", TOOTH_DIAGNOSES, acc::tooth_treatment),
    FieldSpec::new("tooth_priority", TOOTH_DIAGNOSES, acc::tooth_priority),
    FieldSpec::new("tooth_status", TOOTH_DIAGNOSES, acc::tooth_status),
    FieldSpec::new("affected_teeth_count", TOOTH_DIAGNOSES, acc::affected_teeth_count),
    FieldSpec::new("appointment_status", APPOINTMENTS, acc::appointment_status),
    FieldSpec::new("last_visit", APPOINTMENTS, acc::last_visit),
    FieldSpec::new("satisfaction_rating", APPOINTMENTS, acc::satisfaction_rating),
    FieldSpec::new("attended", APPOINTMENTS, acc::attended),
];

static REGISTRY: LazyLock<HashMap<&'static str, FieldSpec>> =
    LazyLock::new(|| FIELDS.iter().map(|spec| (spec.name, *spec)).collect());

pub fn lookup(field: &str) -> Option<&'static FieldSpec> {
    REGISTRY.get(field)
}

/// Every registered field name, in table order.
pub fn field_names() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|spec| spec.name)
}

/// Evaluate one criterion against one patient.
///
/// A predicate whose source was not merged onto the patient is false.
pub fn evaluate(patient: &EnrichedPatient, criterion: &FilterCriterion, ctx: &EvalContext) -> bool {
    let Some(spec) = lookup(&criterion.field) else {
        return ctx.unknown_fields == UnknownFieldPolicy::FailOpen;
    };
    if let Some(source) = spec.source {
        if !patient.has_source(source) {
            return false;
        }
    }
    let value = spec.resolve(patient, ctx);
    compare(criterion.operator, value.as_ref(), &criterion.value)
}
