//! Patient matching: classify, enrich, filter, transform, score.

use chrono::NaiveDate;

use super::classifier::{self, Classification};
use super::enrichment;
use super::fallback;
use super::registry;
use super::transform;
use super::types::{EnrichedPatient, EvalContext, MatchPath, MatchReport};
use crate::config::{EngineConfig, UnknownFieldPolicy};
use crate::db::RecordStore;
use crate::models::{FilterCriterion, LogicalOperator};

/// Run a criteria list against the store.
///
/// Infrastructure failures are absorbed: a failing base fetch switches to
/// the demographics-only fallback, which itself degrades to an empty list.
pub fn find_matching_patients<S: RecordStore + ?Sized>(
    store: &S,
    criteria: &[FilterCriterion],
    config: &EngineConfig,
    today: NaiveDate,
) -> MatchReport {
    let ctx = EvalContext {
        today,
        unknown_fields: config.unknown_fields,
    };
    let classification = classifier::classify(criteria);
    log_criteria_notes(criteria, &classification, config.unknown_fields);

    let sources = classification.ordered_sources();
    let enriched = match enrichment::enrich(store, &sources, &config.limits) {
        Ok(enriched) => enriched,
        Err(e) => {
            tracing::error!(error = %e, "Enrichment failed, using demographic fallback");
            return fallback::run(store, criteria, &classification, &config.limits, &ctx);
        }
    };

    let filtered = apply_filters(enriched.patients, &classification, &ctx);
    let patients = transform::to_results(filtered, criteria, &ctx);
    tracing::info!(
        criteria = criteria.len(),
        matched = patients.len(),
        "Patient matching complete"
    );

    MatchReport {
        patients,
        path: MatchPath::Enriched,
        failed_sources: enriched.failed_sources,
    }
}

/// Clinical predicates first, then demographic ones.
fn apply_filters(
    mut patients: Vec<EnrichedPatient>,
    classification: &Classification<'_>,
    ctx: &EvalContext,
) -> Vec<EnrichedPatient> {
    let ordered = classification
        .clinical
        .iter()
        .chain(classification.demographic.iter());
    for criterion in ordered {
        patients.retain(|p| registry::evaluate(p, criterion, ctx));
        tracing::debug!(
            field = %criterion.field,
            operator = ?criterion.operator,
            remaining = patients.len(),
            "Applied criterion"
        );
    }
    patients
}

fn log_criteria_notes(
    criteria: &[FilterCriterion],
    classification: &Classification<'_>,
    policy: UnknownFieldPolicy,
) {
    for field in &classification.unknown_fields {
        match policy {
            UnknownFieldPolicy::FailOpen => {
                tracing::warn!(field = %field, "Unknown filter field, passing all patients")
            }
            UnknownFieldPolicy::Reject => {
                tracing::warn!(field = %field, "Unknown filter field, rejecting all patients")
            }
        }
    }
    if criteria
        .iter()
        .any(|c| c.logical_operator == Some(LogicalOperator::Or))
    {
        tracing::debug!("OR logical operator supplied; criteria are combined with AND");
    }
}
