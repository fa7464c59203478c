use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "dentcohort";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the database location.
pub const DATABASE_PATH_ENV: &str = "DENTCOHORT_DB";

/// Base patient fetch cap for one filtering request.
pub const PATIENT_FETCH_LIMIT: usize = 500;
/// Per-source caps for enrichment fetches.
pub const CONSULTATION_FETCH_LIMIT: usize = 1_000;
pub const TREATMENT_FETCH_LIMIT: usize = 1_000;
pub const APPOINTMENT_FETCH_LIMIT: usize = 1_000;
pub const TOOTH_DIAGNOSIS_FETCH_LIMIT: usize = 2_000;

/// Cohort group used when the caller does not name one.
pub const DEFAULT_GROUP_NAME: &str = "Control";
/// Anonymized ids look like `P001`.
pub const ANONYMOUS_ID_PREFIX: &str = "P";
pub const ANONYMOUS_ID_WIDTH: usize = 3;
/// Insert attempts before giving up on a contended anonymized id.
pub const MEMBERSHIP_INSERT_ATTEMPTS: u32 = 5;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "dentcohort_lib=info,warn"
}

/// Get the application data directory
/// ~/.dentcohort/ on all platforms
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".dentcohort")
}

/// Database file, honouring `DENTCOHORT_DB` when set.
pub fn database_path() -> PathBuf {
    match std::env::var(DATABASE_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => app_data_dir().join("records.db"),
    }
}

/// Row caps applied by one filtering request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub patients: usize,
    pub consultations: usize,
    pub treatments: usize,
    pub tooth_diagnoses: usize,
    pub appointments: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            patients: PATIENT_FETCH_LIMIT,
            consultations: CONSULTATION_FETCH_LIMIT,
            treatments: TREATMENT_FETCH_LIMIT,
            tooth_diagnoses: TOOTH_DIAGNOSIS_FETCH_LIMIT,
            appointments: APPOINTMENT_FETCH_LIMIT,
        }
    }
}

/// What a predicate on an unregistered field evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFieldPolicy {
    /// Pass the patient through and log a warning.
    #[default]
    FailOpen,
    /// Treat the predicate as unmatched.
    Reject,
}

/// Knobs for one cohort engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub limits: FetchLimits,
    pub unknown_fields: UnknownFieldPolicy,
}
