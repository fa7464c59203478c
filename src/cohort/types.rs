//! Core types for cohort matching.
//!
//! These types model the lifecycle:
//! Criteria → Enriched patients → Filtered set → Match results.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::UnknownFieldPolicy;
use crate::models::enums::{MembershipStatus, RecordSource};
use crate::models::*;

// ═══════════════════════════════════════════
// Enriched Patient (output of enrichment)
// ═══════════════════════════════════════════

/// A base patient with every related record the request asked for.
///
/// `merged` lists the sources whose fetch succeeded; predicates on a source
/// that is not merged never match.
#[derive(Debug, Clone)]
pub struct EnrichedPatient {
    pub patient: Patient,
    pub latest_consultation: Option<Consultation>,
    /// All treatments, newest first.
    pub treatments: Vec<Treatment>,
    /// All tooth-level diagnoses, newest first.
    pub tooth_diagnoses: Vec<ToothDiagnosis>,
    pub latest_appointment: Option<Appointment>,
    pub merged: HashSet<RecordSource>,
}

impl EnrichedPatient {
    /// Patient with no related records and no merged sources.
    pub fn bare(patient: Patient) -> Self {
        Self {
            patient,
            latest_consultation: None,
            treatments: Vec::new(),
            tooth_diagnoses: Vec::new(),
            latest_appointment: None,
            merged: HashSet::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.patient.id
    }

    pub fn has_source(&self, source: RecordSource) -> bool {
        self.merged.contains(&source)
    }

    pub fn clinical_data(&self) -> Option<&ClinicalData> {
        self.latest_consultation.as_ref().map(|c| &c.clinical_data)
    }

    pub fn treatment_count(&self) -> usize {
        self.treatments.len()
    }

    pub fn latest_treatment(&self) -> Option<&Treatment> {
        self.treatments.first()
    }

    /// Distinct FDI numbers with at least one diagnosis.
    pub fn affected_teeth_count(&self) -> usize {
        self.tooth_diagnoses
            .iter()
            .map(|t| t.tooth_number)
            .collect::<HashSet<_>>()
            .len()
    }
}

// ═══════════════════════════════════════════
// Match Result (public row shape)
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub last_visit: String,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_type: Option<String>,
    pub match_score: u8,
}

/// Which pipeline produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPath {
    Enriched,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct MatchReport {
    pub patients: Vec<MatchResult>,
    pub path: MatchPath,
    /// Sources whose fetch failed during enrichment.
    pub failed_sources: Vec<RecordSource>,
}

impl MatchReport {
    pub fn count(&self) -> usize {
        self.patients.len()
    }
}

// ═══════════════════════════════════════════
// Cohort listing
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortPatient {
    pub membership_id: Uuid,
    pub patient_id: Uuid,
    pub anonymous_id: String,
    pub group_name: String,
    pub status: MembershipStatus,
    pub inclusion_date: String,
    pub patient_name: String,
    pub age: Option<u32>,
}

/// Inputs shared by every predicate in one request.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
    pub today: NaiveDate,
    pub unknown_fields: UnknownFieldPolicy,
}
