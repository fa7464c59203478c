//! Record store boundary consumed by the cohort engine.
//!
//! The engine only needs "fetch rows by table + filter" and
//! "insert/update/delete row"; `RecordStore` names exactly those
//! operations so tests can substitute failing or counting stores.

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use super::repository;
use super::{open_database, open_memory_database, DatabaseError};
use crate::models::enums::ProjectStatus;
use crate::models::*;

pub trait RecordStore {
    /// Newest patients first, at most `limit`.
    fn fetch_patients(&self, limit: usize) -> Result<Vec<Patient>, DatabaseError>;

    fn fetch_patients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Patient>, DatabaseError>;

    fn fetch_consultations(
        &self,
        patient_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<Consultation>, DatabaseError>;

    fn fetch_treatments(
        &self,
        patient_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<Treatment>, DatabaseError>;

    fn fetch_tooth_diagnoses(
        &self,
        patient_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<ToothDiagnosis>, DatabaseError>;

    fn fetch_appointments(
        &self,
        patient_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<Appointment>, DatabaseError>;

    fn insert_project(&self, project: &ResearchProject) -> Result<(), DatabaseError>;

    fn get_project(&self, id: &Uuid) -> Result<Option<ResearchProject>, DatabaseError>;

    fn list_projects(&self, owner_id: &Uuid) -> Result<Vec<ResearchProject>, DatabaseError>;

    fn update_project_status(
        &self,
        id: &Uuid,
        status: ProjectStatus,
        updated_at: &NaiveDateTime,
    ) -> Result<(), DatabaseError>;

    fn find_membership(
        &self,
        project_id: &Uuid,
        patient_id: &Uuid,
    ) -> Result<Option<CohortMembership>, DatabaseError>;

    /// Anonymous ids in use by a project's memberships, any status.
    fn list_anonymous_ids(&self, project_id: &Uuid) -> Result<Vec<String>, DatabaseError>;

    /// Must reject duplicates on (project, patient) and (project, anonymous id)
    /// with `DatabaseError::ConstraintViolation`.
    fn insert_membership(&self, membership: &CohortMembership) -> Result<(), DatabaseError>;

    fn update_membership_group(
        &self,
        membership_id: &Uuid,
        group_name: &str,
    ) -> Result<(), DatabaseError>;

    fn delete_membership(&self, project_id: &Uuid, patient_id: &Uuid) -> Result<usize, DatabaseError>;

    fn list_included_memberships(
        &self,
        project_id: &Uuid,
    ) -> Result<Vec<CohortMembership>, DatabaseError>;
}

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(open_memory_database()?))
    }

    /// Underlying connection, for seeding records the engine only reads.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordStore for SqliteRecordStore {
    fn fetch_patients(&self, limit: usize) -> Result<Vec<Patient>, DatabaseError> {
        repository::fetch_patients(&self.conn, limit)
    }

    fn fetch_patients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Patient>, DatabaseError> {
        repository::fetch_patients_by_ids(&self.conn, ids)
    }

    fn fetch_consultations(
        &self,
        patient_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<Consultation>, DatabaseError> {
        repository::fetch_consultations_for(&self.conn, patient_ids, limit)
    }

    fn fetch_treatments(
        &self,
        patient_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<Treatment>, DatabaseError> {
        repository::fetch_treatments_for(&self.conn, patient_ids, limit)
    }

    fn fetch_tooth_diagnoses(
        &self,
        patient_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<ToothDiagnosis>, DatabaseError> {
        repository::fetch_tooth_diagnoses_for(&self.conn, patient_ids, limit)
    }

    fn fetch_appointments(
        &self,
        patient_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        repository::fetch_appointments_for(&self.conn, patient_ids, limit)
    }

    fn insert_project(&self, project: &ResearchProject) -> Result<(), DatabaseError> {
        repository::insert_research_project(&self.conn, project)
    }

    fn get_project(&self, id: &Uuid) -> Result<Option<ResearchProject>, DatabaseError> {
        repository::get_research_project(&self.conn, id)
    }

    fn list_projects(&self, owner_id: &Uuid) -> Result<Vec<ResearchProject>, DatabaseError> {
        repository::list_research_projects_for_owner(&self.conn, owner_id)
    }

    fn update_project_status(
        &self,
        id: &Uuid,
        status: ProjectStatus,
        updated_at: &NaiveDateTime,
    ) -> Result<(), DatabaseError> {
        repository::update_research_project_status(&self.conn, id, status, updated_at)
    }

    fn find_membership(
        &self,
        project_id: &Uuid,
        patient_id: &Uuid,
    ) -> Result<Option<CohortMembership>, DatabaseError> {
        repository::get_membership(&self.conn, project_id, patient_id)
    }

    fn list_anonymous_ids(&self, project_id: &Uuid) -> Result<Vec<String>, DatabaseError> {
        repository::list_anonymous_ids(&self.conn, project_id)
    }

    fn insert_membership(&self, membership: &CohortMembership) -> Result<(), DatabaseError> {
        repository::insert_membership(&self.conn, membership)
    }

    fn update_membership_group(
        &self,
        membership_id: &Uuid,
        group_name: &str,
    ) -> Result<(), DatabaseError> {
        repository::update_membership_group(&self.conn, membership_id, group_name)
    }

    fn delete_membership(&self, project_id: &Uuid, patient_id: &Uuid) -> Result<usize, DatabaseError> {
        repository::delete_membership(&self.conn, project_id, patient_id)
    }

    fn list_included_memberships(
        &self,
        project_id: &Uuid,
    ) -> Result<Vec<CohortMembership>, DatabaseError> {
        repository::list_included_memberships(&self.conn, project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe (can be used as `dyn RecordStore`)
    #[test]
    fn record_store_is_object_safe() {
        fn _assert_store(_: &dyn RecordStore) {}
        let store = SqliteRecordStore::open_in_memory().unwrap();
        _assert_store(&store);
    }

    #[test]
    fn empty_store_returns_empty_lists() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        assert!(store.fetch_patients(500).unwrap().is_empty());
        assert!(store.fetch_consultations(&[Uuid::new_v4()], 10).unwrap().is_empty());
        assert!(store.list_anonymous_ids(&Uuid::new_v4()).unwrap().is_empty());
    }
}
