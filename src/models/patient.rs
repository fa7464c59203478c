use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Patient {
    /// Whole years between date of birth and `today`. Never stored.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| age_between(dob, today))
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Birthday-aware age in whole years. `None` when `dob` is in the future.
pub fn age_between(dob: NaiveDate, today: NaiveDate) -> Option<u32> {
    if dob > today {
        return None;
    }
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_completed_years_only() {
        assert_eq!(age_between(date(1990, 6, 15), date(2024, 6, 14)), Some(33));
        assert_eq!(age_between(date(1990, 6, 15), date(2024, 6, 15)), Some(34));
    }

    #[test]
    fn leap_day_birthday() {
        assert_eq!(age_between(date(2000, 2, 29), date(2024, 2, 28)), Some(23));
        assert_eq!(age_between(date(2000, 2, 29), date(2024, 3, 1)), Some(24));
    }

    #[test]
    fn future_birth_date_has_no_age() {
        assert_eq!(age_between(date(2030, 1, 1), date(2024, 1, 1)), None);
    }

    #[test]
    fn patient_without_dob_has_no_age() {
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Lopes".into(),
            date_of_birth: None,
            gender: None,
            created_at: date(2024, 1, 1).and_hms_opt(9, 0, 0).unwrap(),
        };
        assert_eq!(patient.age_on(date(2024, 6, 1)), None);
        assert_eq!(patient.display_name(), "Ana Lopes");
    }
}
