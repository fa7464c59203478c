//! Typed view over a consultation's `clinical_data` document.
//!
//! Each sub-section is parsed on its own: an absent or malformed section is
//! `None` (or an empty list) and never prevents the other sections from
//! loading. Field-level shape errors degrade the same way.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ClinicalData {
    pub pain_assessment: Option<PainAssessment>,
    pub diagnosis: Option<DiagnosisSection>,
    pub treatment_plan: Option<TreatmentPlan>,
    pub clinical_examination: Option<ClinicalExamination>,
    pub medical_history: Option<MedicalHistory>,
    pub investigations: Vec<Investigation>,
    pub prescription_data: Vec<PrescriptionEntry>,
    pub follow_up_data: Option<FollowUp>,
}

impl From<Value> for ClinicalData {
    fn from(value: Value) -> Self {
        let Value::Object(doc) = value else {
            return Self::default();
        };
        Self {
            pain_assessment: lenient::parse_section(doc.get("pain_assessment")),
            diagnosis: lenient::parse_section(doc.get("diagnosis")),
            treatment_plan: lenient::parse_section(doc.get("treatment_plan")),
            clinical_examination: lenient::parse_section(doc.get("clinical_examination")),
            medical_history: lenient::parse_section(doc.get("medical_history")),
            investigations: lenient::parse_array_lenient(doc.get("investigations")),
            prescription_data: lenient::parse_array_lenient(doc.get("prescription_data")),
            follow_up_data: lenient::parse_section(doc.get("follow_up_data")),
        }
    }
}

impl ClinicalData {
    /// Parse stored JSON text. Invalid JSON yields an empty document.
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str::<Value>(raw)
            .map(Self::from)
            .unwrap_or_default()
    }

    /// Display names across every diagnosis slot, in clinical priority order.
    pub fn diagnosis_names(&self) -> Vec<String> {
        let Some(dx) = &self.diagnosis else {
            return vec![];
        };
        dx.final_
            .iter()
            .filter_map(DiagnosisEntry::display_name)
            .chain(dx.primary.clone())
            .chain(dx.secondary.clone())
            .chain(dx.provisional.iter().filter_map(DiagnosisEntry::display_name))
            .chain(dx.differential.iter().filter_map(DiagnosisEntry::display_name))
            .collect()
    }

    pub fn treatment_plan_entries(&self) -> Vec<String> {
        let Some(plan) = &self.treatment_plan else {
            return vec![];
        };
        plan.procedure
            .iter()
            .cloned()
            .chain(plan.plan.iter().cloned())
            .collect()
    }

    pub fn prognosis(&self) -> Option<&str> {
        self.treatment_plan.as_ref()?.prognosis.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PainAssessment {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub intensity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub character: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub triggers: Vec<String>,
}

/// A diagnosis is stored either as plain text or as a coded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosisEntry {
    Name(String),
    Coded {
        #[serde(default, alias = "name", deserialize_with = "lenient::opt_string")]
        diagnosis_name: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_string")]
        icd_code: Option<String>,
    },
}

impl DiagnosisEntry {
    pub fn display_name(&self) -> Option<String> {
        match self {
            Self::Name(name) => Some(name.trim().to_string()).filter(|n| !n.is_empty()),
            Self::Coded { diagnosis_name, .. } => diagnosis_name.clone(),
        }
    }

    pub fn icd_code(&self) -> Option<&str> {
        match self {
            Self::Name(_) => None,
            Self::Coded { icd_code, .. } => icd_code.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisSection {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub primary: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub secondary: Option<String>,
    #[serde(default, deserialize_with = "lenient::lenient_list")]
    pub provisional: Vec<DiagnosisEntry>,
    #[serde(default, deserialize_with = "lenient::lenient_list")]
    pub differential: Vec<DiagnosisEntry>,
    #[serde(rename = "final", default, deserialize_with = "lenient::lenient_list")]
    pub final_: Vec<DiagnosisEntry>,
}

impl DiagnosisSection {
    pub fn icd_codes(&self) -> Vec<String> {
        self.final_
            .iter()
            .chain(&self.provisional)
            .chain(&self.differential)
            .filter_map(|entry| entry.icd_code().map(str::to_string))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub procedure: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub complexity: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tooth_numbers: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub estimated_duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub prognosis: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub plan: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalExamination {
    #[serde(default, deserialize_with = "lenient::section")]
    pub periodontal: Option<Periodontal>,
    #[serde(default)]
    pub mobility: Option<Mobility>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub soft_tissue: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Periodontal {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub max_pocket_depth: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_truthy")]
    pub bleeding_on_probing: Option<bool>,
}

/// Mobility is recorded as `{grade}` or as a bare grade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Mobility {
    pub grade: Option<String>,
}

impl From<Value> for Mobility {
    fn from(value: Value) -> Self {
        let grade = match &value {
            Value::Object(map) => map.get("grade").and_then(lenient::value_as_string),
            other => lenient::value_as_string(other),
        };
        Self { grade }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistory {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub conditions: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub medications: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Investigation {
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub findings: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionEntry {
    #[serde(
        default,
        alias = "medication",
        alias = "name",
        deserialize_with = "lenient::opt_string"
    )]
    pub medication_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    #[serde(default, deserialize_with = "lenient::opt_truthy")]
    pub required: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub interval_days: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_document() -> Value {
        json!({
            "pain_assessment": {"intensity": "7", "location": "lower left", "triggers": ["cold", "biting"]},
            "diagnosis": {
                "primary": "Irreversible pulpitis",
                "provisional": ["Caries"],
                "final": [{"diagnosis_name": "Pulpitis", "icd_code": "K04.0"}, "Periapical abscess"]
            },
            "treatment_plan": {"procedure": "Root canal", "tooth_numbers": [36, "37"], "estimated_duration": 90, "prognosis": "Good"},
            "clinical_examination": {
                "periodontal": {"max_pocket_depth": 5.5, "bleeding_on_probing": true},
                "mobility": 2,
                "soft_tissue": "Normal"
            },
            "medical_history": {"conditions": ["Diabetes"], "allergies": "Penicillin"},
            "investigations": [{"type": "IOPA", "findings": "Periapical radiolucency"}, "bad"],
            "prescription_data": [{"medication_name": "Amoxicillin", "dosage": "500mg"}, {"name": "Ibuprofen"}],
            "follow_up_data": {"required": "yes", "follow_up_date": "2024-05-01T00:00:00Z", "interval_days": "14"}
        })
    }

    #[test]
    fn parses_every_section() {
        let data = ClinicalData::from(full_document());
        assert_eq!(data.pain_assessment.as_ref().unwrap().intensity, Some(7.0));
        assert_eq!(data.pain_assessment.as_ref().unwrap().triggers, vec!["cold", "biting"]);
        let tp = data.treatment_plan.as_ref().unwrap();
        assert_eq!(tp.tooth_numbers, vec!["36", "37"]);
        assert_eq!(tp.estimated_duration, Some(90.0));
        let exam = data.clinical_examination.as_ref().unwrap();
        assert_eq!(exam.periodontal.as_ref().unwrap().max_pocket_depth, Some(5.5));
        assert_eq!(exam.mobility.as_ref().unwrap().grade.as_deref(), Some("2"));
        assert_eq!(data.medical_history.as_ref().unwrap().allergies, vec!["Penicillin"]);
        assert_eq!(data.investigations.len(), 1);
        assert_eq!(data.prescription_data.len(), 2);
        assert_eq!(data.prescription_data[1].medication_name.as_deref(), Some("Ibuprofen"));
        let fu = data.follow_up_data.as_ref().unwrap();
        assert_eq!(fu.required, Some(true));
        assert_eq!(fu.follow_up_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(fu.interval_days, Some(14.0));
    }

    #[test]
    fn diagnosis_entries_normalize_to_display_names() {
        let data = ClinicalData::from(full_document());
        let names = data.diagnosis_names();
        assert_eq!(names[0], "Pulpitis");
        assert_eq!(names[1], "Periapical abscess");
        assert!(names.contains(&"Irreversible pulpitis".to_string()));
        assert!(names.contains(&"Caries".to_string()));
        assert_eq!(data.diagnosis.unwrap().icd_codes(), vec!["K04.0"]);
    }

    #[test]
    fn malformed_section_does_not_hide_others() {
        let data = ClinicalData::from(json!({
            "pain_assessment": "severe",
            "diagnosis": {"primary": "Gingivitis"},
            "investigations": {"type": "not an array"}
        }));
        assert!(data.pain_assessment.is_none());
        assert!(data.investigations.is_empty());
        assert_eq!(data.diagnosis.unwrap().primary.as_deref(), Some("Gingivitis"));
    }

    #[test]
    fn invalid_json_text_is_empty_document() {
        assert_eq!(ClinicalData::parse("{not json"), ClinicalData::default());
        assert_eq!(ClinicalData::parse("[]"), ClinicalData::default());
    }

    #[test]
    fn wrong_field_shapes_become_none() {
        let data = ClinicalData::from(json!({
            "pain_assessment": {"intensity": {"value": 3}, "location": ["a"]}
        }));
        let pain = data.pain_assessment.unwrap();
        assert_eq!(pain.intensity, None);
        assert_eq!(pain.location, None);
    }

    #[test]
    fn stored_document_round_trips() {
        let data = ClinicalData::from(full_document());
        let text = serde_json::to_string(&data).unwrap();
        assert_eq!(ClinicalData::parse(&text), data);
    }
}
