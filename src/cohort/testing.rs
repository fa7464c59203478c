//! Store doubles and seeding helpers shared by the cohort tests.

use std::cell::Cell;
use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{repository, DatabaseError, RecordStore, SqliteRecordStore};
use crate::models::enums::{ProjectStatus, RecordSource};
use crate::models::*;

pub fn base_time() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-01-01 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn make_patient(first: &str, dob: Option<NaiveDate>, created_at: NaiveDateTime) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        first_name: first.into(),
        last_name: "Teste".into(),
        date_of_birth: dob,
        gender: Some("female".into()),
        created_at,
    }
}

pub fn seed_patient(conn: &Connection, first: &str, dob: Option<NaiveDate>) -> Uuid {
    let patient = make_patient(first, dob, base_time());
    repository::insert_patient(conn, &patient).unwrap();
    patient.id
}

pub fn seed_project(store: &SqliteRecordStore, owner: Uuid) -> Uuid {
    let project = ResearchProject {
        id: Uuid::new_v4(),
        owner_id: owner,
        title: "Endodontic outcomes".into(),
        description: None,
        status: ProjectStatus::Draft,
        created_at: base_time(),
        updated_at: base_time(),
    };
    store.insert_project(&project).unwrap();
    project.id
}

fn simulated() -> DatabaseError {
    DatabaseError::ConstraintViolation("simulated outage".into())
}

/// In-memory store whose fetches can be made to fail.
pub struct FlakyStore {
    patients: Vec<Patient>,
    base_failures: Cell<usize>,
    failing: HashSet<RecordSource>,
    child_fetches: Cell<usize>,
}

impl FlakyStore {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self {
            patients,
            base_failures: Cell::new(0),
            failing: HashSet::new(),
            child_fetches: Cell::new(0),
        }
    }

    /// `count` patients, newest first, born 1970 onwards.
    pub fn seeded(count: usize) -> Self {
        let patients = (0..count)
            .map(|i| {
                make_patient(
                    &format!("P{i}"),
                    NaiveDate::from_ymd_opt(1970 + i as i32, 1, 1),
                    base_time() - Duration::days(i as i64),
                )
            })
            .collect();
        Self::new(patients)
    }

    pub fn failing(mut self, source: RecordSource) -> Self {
        self.failing.insert(source);
        self
    }

    pub fn failing_base(self) -> Self {
        self.failing_base_times(usize::MAX)
    }

    /// Fail the next `times` base fetches, then recover.
    pub fn failing_base_times(self, times: usize) -> Self {
        self.base_failures.set(times);
        self
    }

    pub fn child_fetches(&self) -> usize {
        self.child_fetches.get()
    }

    fn child<T>(&self, source: RecordSource) -> Result<Vec<T>, DatabaseError> {
        self.child_fetches.set(self.child_fetches.get() + 1);
        if self.failing.contains(&source) {
            return Err(simulated());
        }
        Ok(Vec::new())
    }
}

impl RecordStore for FlakyStore {
    fn fetch_patients(&self, limit: usize) -> Result<Vec<Patient>, DatabaseError> {
        let remaining = self.base_failures.get();
        if remaining > 0 {
            self.base_failures.set(remaining - 1);
            return Err(simulated());
        }
        Ok(self.patients.iter().take(limit).cloned().collect())
    }

    fn fetch_patients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Patient>, DatabaseError> {
        Ok(self.patients.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
    }

    fn fetch_consultations(&self, _: &[Uuid], _: usize) -> Result<Vec<Consultation>, DatabaseError> {
        self.child(RecordSource::Consultations)
    }

    fn fetch_treatments(&self, _: &[Uuid], _: usize) -> Result<Vec<Treatment>, DatabaseError> {
        self.child(RecordSource::Treatments)
    }

    fn fetch_tooth_diagnoses(&self, _: &[Uuid], _: usize) -> Result<Vec<ToothDiagnosis>, DatabaseError> {
        self.child(RecordSource::ToothDiagnoses)
    }

    fn fetch_appointments(&self, _: &[Uuid], _: usize) -> Result<Vec<Appointment>, DatabaseError> {
        self.child(RecordSource::Appointments)
    }

    fn insert_project(&self, _: &ResearchProject) -> Result<(), DatabaseError> {
        Err(simulated())
    }

    fn get_project(&self, _: &Uuid) -> Result<Option<ResearchProject>, DatabaseError> {
        Ok(None)
    }

    fn list_projects(&self, _: &Uuid) -> Result<Vec<ResearchProject>, DatabaseError> {
        Ok(Vec::new())
    }

    fn update_project_status(&self, _: &Uuid, _: ProjectStatus, _: &NaiveDateTime) -> Result<(), DatabaseError> {
        Err(simulated())
    }

    fn find_membership(&self, _: &Uuid, _: &Uuid) -> Result<Option<CohortMembership>, DatabaseError> {
        Ok(None)
    }

    fn list_anonymous_ids(&self, _: &Uuid) -> Result<Vec<String>, DatabaseError> {
        Ok(Vec::new())
    }

    fn insert_membership(&self, _: &CohortMembership) -> Result<(), DatabaseError> {
        Err(simulated())
    }

    fn update_membership_group(&self, _: &Uuid, _: &str) -> Result<(), DatabaseError> {
        Err(simulated())
    }

    fn delete_membership(&self, _: &Uuid, _: &Uuid) -> Result<usize, DatabaseError> {
        Ok(0)
    }

    fn list_included_memberships(&self, _: &Uuid) -> Result<Vec<CohortMembership>, DatabaseError> {
        Ok(Vec::new())
    }
}

/// SQLite store where another writer grabs the next anonymous ids first.
///
/// Each of the first `clashes` membership inserts is preceded by a rival
/// insert using the same anonymous id for a different patient.
pub struct ContendedStore {
    pub inner: SqliteRecordStore,
    clashes: Cell<u32>,
    pub inserts: Cell<u32>,
}

impl ContendedStore {
    pub fn new(inner: SqliteRecordStore, clashes: u32) -> Self {
        Self { inner, clashes: Cell::new(clashes), inserts: Cell::new(0) }
    }
}

impl RecordStore for ContendedStore {
    fn fetch_patients(&self, limit: usize) -> Result<Vec<Patient>, DatabaseError> {
        self.inner.fetch_patients(limit)
    }

    fn fetch_patients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Patient>, DatabaseError> {
        self.inner.fetch_patients_by_ids(ids)
    }

    fn fetch_consultations(&self, ids: &[Uuid], limit: usize) -> Result<Vec<Consultation>, DatabaseError> {
        self.inner.fetch_consultations(ids, limit)
    }

    fn fetch_treatments(&self, ids: &[Uuid], limit: usize) -> Result<Vec<Treatment>, DatabaseError> {
        self.inner.fetch_treatments(ids, limit)
    }

    fn fetch_tooth_diagnoses(&self, ids: &[Uuid], limit: usize) -> Result<Vec<ToothDiagnosis>, DatabaseError> {
        self.inner.fetch_tooth_diagnoses(ids, limit)
    }

    fn fetch_appointments(&self, ids: &[Uuid], limit: usize) -> Result<Vec<Appointment>, DatabaseError> {
        self.inner.fetch_appointments(ids, limit)
    }

    fn insert_project(&self, project: &ResearchProject) -> Result<(), DatabaseError> {
        self.inner.insert_project(project)
    }

    fn get_project(&self, id: &Uuid) -> Result<Option<ResearchProject>, DatabaseError> {
        self.inner.get_project(id)
    }

    fn list_projects(&self, owner_id: &Uuid) -> Result<Vec<ResearchProject>, DatabaseError> {
        self.inner.list_projects(owner_id)
    }

    fn update_project_status(&self, id: &Uuid, status: ProjectStatus, at: &NaiveDateTime) -> Result<(), DatabaseError> {
        self.inner.update_project_status(id, status, at)
    }

    fn find_membership(&self, project_id: &Uuid, patient_id: &Uuid) -> Result<Option<CohortMembership>, DatabaseError> {
        self.inner.find_membership(project_id, patient_id)
    }

    fn list_anonymous_ids(&self, project_id: &Uuid) -> Result<Vec<String>, DatabaseError> {
        self.inner.list_anonymous_ids(project_id)
    }

    fn insert_membership(&self, membership: &CohortMembership) -> Result<(), DatabaseError> {
        self.inserts.set(self.inserts.get() + 1);
        if self.clashes.get() > 0 {
            self.clashes.set(self.clashes.get() - 1);
            let rival = seed_patient(self.inner.connection(), "Rival", None);
            let mut row = membership.clone();
            row.id = Uuid::new_v4();
            row.patient_id = rival;
            self.inner.insert_membership(&row)?;
        }
        self.inner.insert_membership(membership)
    }

    fn update_membership_group(&self, membership_id: &Uuid, group_name: &str) -> Result<(), DatabaseError> {
        self.inner.update_membership_group(membership_id, group_name)
    }

    fn delete_membership(&self, project_id: &Uuid, patient_id: &Uuid) -> Result<usize, DatabaseError> {
        self.inner.delete_membership(project_id, patient_id)
    }

    fn list_included_memberships(&self, project_id: &Uuid) -> Result<Vec<CohortMembership>, DatabaseError> {
        self.inner.list_included_memberships(project_id)
    }
}
