//! Heuristic 0-100 relevance score. Advisory only: it never filters.

use super::registry;
use super::types::{EnrichedPatient, EvalContext};
use crate::models::FilterCriterion;

/// Field families scored on presence rather than on the exact predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Diagnosis,
    Treatment,
    Prognosis,
}

fn family_of(field: &str) -> Option<Family> {
    if field.contains("diagnosis") || field.contains("icd") {
        Some(Family::Diagnosis)
    } else if field.contains("treatment") {
        Some(Family::Treatment)
    } else if field.contains("prognosis") {
        Some(Family::Prognosis)
    } else {
        None
    }
}

fn has_family_value(patient: &EnrichedPatient, family: Family) -> bool {
    let clinical = patient.clinical_data();
    match family {
        Family::Diagnosis => {
            clinical.is_some_and(|c| {
                !c.diagnosis_names().is_empty()
                    || c.diagnosis.as_ref().is_some_and(|d| !d.icd_codes().is_empty())
            }) || patient
                .tooth_diagnoses
                .iter()
                .any(|t| t.primary_diagnosis.as_deref().is_some_and(|d| !d.trim().is_empty()))
        }
        Family::Treatment => {
            !patient.treatments.is_empty()
                || clinical.is_some_and(|c| !c.treatment_plan_entries().is_empty())
        }
        Family::Prognosis => clinical
            .and_then(|c| c.prognosis())
            .is_some_and(|p| !p.trim().is_empty()),
    }
}

fn criterion_matches(patient: &EnrichedPatient, criterion: &FilterCriterion, ctx: &EvalContext) -> bool {
    match family_of(&criterion.field) {
        Some(family) => has_family_value(patient, family),
        None => registry::evaluate(patient, criterion, ctx),
    }
}

/// `round(100 * matching / total)`; 100 for an empty criteria list.
pub fn match_score(patient: &EnrichedPatient, criteria: &[FilterCriterion], ctx: &EvalContext) -> u8 {
    if criteria.is_empty() {
        return 100;
    }
    let matching = criteria
        .iter()
        .filter(|c| criterion_matches(patient, c, ctx))
        .count();
    let score = (100.0 * matching as f64 / criteria.len() as f64).round();
    score.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::testing::{base_time, make_patient};
    use crate::config::UnknownFieldPolicy;
    use crate::models::enums::RecordSource;
    use crate::models::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use uuid::Uuid;

    fn ctx() -> EvalContext {
        EvalContext {
            today: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            unknown_fields: UnknownFieldPolicy::FailOpen,
        }
    }

    fn aged(years_old_in_2025: i32) -> EnrichedPatient {
        EnrichedPatient::bare(make_patient(
            "Rui",
            NaiveDate::from_ymd_opt(2025 - years_old_in_2025, 1, 1),
            base_time(),
        ))
    }

    #[test]
    fn empty_criteria_score_full() {
        assert_eq!(match_score(&aged(40), &[], &ctx()), 100);
    }

    #[test]
    fn demographic_criteria_rerun_the_predicate() {
        let criteria = vec![
            FilterCriterion::new("age", Operator::GreaterThan, 30),
            FilterCriterion::new("gender", Operator::Equals, "male"),
            FilterCriterion::new("first_name", Operator::Equals, "rui"),
        ];
        // 2 of 3 match.
        assert_eq!(match_score(&aged(40), &criteria, &ctx()), 67);
    }

    #[test]
    fn diagnosis_family_counts_any_presence() {
        let mut p = aged(40);
        p.latest_consultation = Some(Consultation {
            id: Uuid::new_v4(),
            patient_id: p.id(),
            consultation_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            status: None,
            clinical_data: ClinicalData::from(json!({"diagnosis": {"primary": "Gingivitis"}})),
        });
        p.merged.insert(RecordSource::Consultations);
        // Predicate itself would not match; the family is present.
        let criteria = vec![FilterCriterion::new("diagnosis_final", Operator::Contains, "pulpitis")];
        assert_eq!(match_score(&p, &criteria, &ctx()), 100);

        let criteria = vec![
            FilterCriterion::new("diagnosis_final", Operator::Contains, "pulpitis"),
            FilterCriterion::new("treatment_type", Operator::Equals, "crown"),
            FilterCriterion::new("prognosis", Operator::Equals, "good"),
        ];
        assert_eq!(match_score(&p, &criteria, &ctx()), 33);
    }

    #[test]
    fn bare_record_scores_zero_on_clinical_fields() {
        let criteria = vec![
            FilterCriterion::new("tooth_status", Operator::In, json!(["caries"])),
            FilterCriterion::new("pain_intensity", Operator::GreaterThan, 3),
        ];
        assert_eq!(match_score(&aged(40), &criteria, &ctx()), 0);
    }

    #[test]
    fn families_are_picked_by_field_name() {
        assert_eq!(family_of("icd_code"), Some(Family::Diagnosis));
        assert_eq!(family_of("tooth_diagnosis"), Some(Family::Diagnosis));
        assert_eq!(family_of("treatment_plan_teeth"), Some(Family::Treatment));
        assert_eq!(family_of("prognosis"), Some(Family::Prognosis));
        assert_eq!(family_of("pain_intensity"), None);
    }
}
