use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same literal as `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ProjectStatus {
    Draft => "draft",
    Active => "active",
    Completed => "completed",
    Paused => "paused",
});

str_enum!(MembershipStatus {
    Included => "included",
    Excluded => "excluded",
    Withdrawn => "withdrawn",
});

// Record sources the enrichment pipeline can attach to a patient.
str_enum!(RecordSource {
    Consultations => "consultations",
    Treatments => "treatments",
    ToothDiagnoses => "toothDiagnoses",
    Appointments => "appointments",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn project_status_round_trip() {
        for (variant, s) in [
            (ProjectStatus::Draft, "draft"),
            (ProjectStatus::Active, "active"),
            (ProjectStatus::Completed, "completed"),
            (ProjectStatus::Paused, "paused"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ProjectStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn membership_status_round_trip() {
        for (variant, s) in [
            (MembershipStatus::Included, "included"),
            (MembershipStatus::Excluded, "excluded"),
            (MembershipStatus::Withdrawn, "withdrawn"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(MembershipStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn record_source_uses_camel_case_tooth_name() {
        assert_eq!(RecordSource::ToothDiagnoses.as_str(), "toothDiagnoses");
        assert_eq!(
            RecordSource::from_str("toothDiagnoses").unwrap(),
            RecordSource::ToothDiagnoses
        );
    }

    #[test]
    fn serde_spelling_matches_as_str() {
        assert_eq!(
            serde_json::to_value(RecordSource::ToothDiagnoses).unwrap(),
            serde_json::json!("toothDiagnoses")
        );
        let parsed: RecordSource = serde_json::from_value(serde_json::json!("toothDiagnoses")).unwrap();
        assert_eq!(parsed, RecordSource::ToothDiagnoses);
        assert_eq!(
            serde_json::to_value(ProjectStatus::Paused).unwrap(),
            serde_json::json!(ProjectStatus::Paused.as_str())
        );
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(ProjectStatus::from_str("archived").is_err());
        assert!(MembershipStatus::from_str("").is_err());
        assert!(RecordSource::from_str("labs").is_err());
    }
}
