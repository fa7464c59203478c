use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum CohortError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("Research project not found")]
    ProjectNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not assign an anonymous id after {attempts} attempts")]
    AnonymousIdExhausted { attempts: u32 },
}
