//! Clinical cohort engine.
//!
//! Filters patients by demographic and clinical criteria, scores the
//! matches, and manages research-project cohort membership.
//!
//! Pipeline: criteria → classifier → enrichment → registry filters
//! (clinical first) → dedup/transform → scoring.

pub mod accessors;
pub mod classifier;
pub mod comparators;
pub mod enrichment;
pub mod error;
pub mod fallback;
pub mod matching;
pub mod membership;
pub mod projects;
pub mod registry;
pub mod scoring;
pub mod transform;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::CohortError;
pub use matching::find_matching_patients;
pub use types::*;
