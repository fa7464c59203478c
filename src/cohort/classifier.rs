//! Field classifier: which record sources a criteria list needs.

use std::collections::HashSet;

use super::registry;
use crate::models::enums::RecordSource;
use crate::models::FilterCriterion;

/// Fetch order for enrichment sources.
pub const SOURCE_ORDER: [RecordSource; 4] = [
    RecordSource::Consultations,
    RecordSource::Treatments,
    RecordSource::ToothDiagnoses,
    RecordSource::Appointments,
];

/// Criteria split by where their data lives.
#[derive(Debug, Default)]
pub struct Classification<'a> {
    /// Criteria on fields backed by a related record source.
    pub clinical: Vec<&'a FilterCriterion>,
    /// Criteria on patient columns, plus unregistered fields.
    pub demographic: Vec<&'a FilterCriterion>,
    pub sources: HashSet<RecordSource>,
    pub unknown_fields: Vec<&'a str>,
}

impl Classification<'_> {
    pub fn has_clinical(&self) -> bool {
        !self.clinical.is_empty()
    }

    /// Required sources in fetch order.
    pub fn ordered_sources(&self) -> Vec<RecordSource> {
        SOURCE_ORDER
            .into_iter()
            .filter(|s| self.sources.contains(s))
            .collect()
    }
}

pub fn classify(criteria: &[FilterCriterion]) -> Classification<'_> {
    let mut out = Classification::default();
    for criterion in criteria {
        match registry::lookup(&criterion.field) {
            Some(spec) => match spec.source {
                Some(source) => {
                    out.sources.insert(source);
                    out.clinical.push(criterion);
                }
                None => out.demographic.push(criterion),
            },
            None => {
                if !out.unknown_fields.contains(&criterion.field.as_str()) {
                    out.unknown_fields.push(&criterion.field);
                }
                out.demographic.push(criterion);
            }
        }
    }
    out
}

/// Sources required by a set of field names.
pub fn required_sources<'a, I>(fields: I) -> HashSet<RecordSource>
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .into_iter()
        .filter_map(registry::lookup)
        .filter_map(|spec| spec.source)
        .collect()
}
