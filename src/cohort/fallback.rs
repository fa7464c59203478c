//! Demographics-only filter path used when enrichment fails.
//!
//! Never surfaces an error: a failing fetch here yields an empty result.

use super::classifier::Classification;
use super::registry;
use super::transform;
use super::types::{EnrichedPatient, EvalContext, MatchPath, MatchReport};
use crate::config::FetchLimits;
use crate::db::RecordStore;
use crate::models::FilterCriterion;

pub fn run<S: RecordStore + ?Sized>(
    store: &S,
    criteria: &[FilterCriterion],
    classification: &Classification<'_>,
    limits: &FetchLimits,
    ctx: &EvalContext,
) -> MatchReport {
    let patients = match store.fetch_patients(limits.patients) {
        Ok(patients) => patients,
        Err(e) => {
            tracing::error!(error = %e, "Fallback patient fetch failed, returning no matches");
            return MatchReport {
                patients: Vec::new(),
                path: MatchPath::Fallback,
                failed_sources: Vec::new(),
            };
        }
    };

    let matched: Vec<EnrichedPatient> = patients
        .into_iter()
        .map(EnrichedPatient::bare)
        .filter(|p| {
            classification
                .demographic
                .iter()
                .all(|c| registry::evaluate(p, c, ctx))
        })
        .collect();

    tracing::info!(
        matched = matched.len(),
        skipped_criteria = classification.clinical.len(),
        "Fallback filtering complete"
    );

    MatchReport {
        patients: transform::to_results(matched, criteria, ctx),
        path: MatchPath::Fallback,
        failed_sources: Vec::new(),
    }
}
