//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per table. All public functions are re-exported here.

mod appointment;
mod cohort_membership;
mod consultation;
mod patient;
mod research_project;
mod tooth_diagnosis;
mod treatment;

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::DatabaseError;

pub use appointment::*;
pub use cohort_membership::*;
pub use consultation::*;
pub use patient::*;
pub use research_project::*;
pub use tooth_diagnosis::*;
pub use treatment::*;

const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_WRITE_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_READ_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid timestamp {raw}: {e}")))
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

/// `?start, ?start+1, …` for an `IN (…)` list of `count` values.
pub(crate) fn id_placeholders(count: usize, start: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
