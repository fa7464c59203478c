pub mod appointment;
pub mod clinical_data;
pub mod consultation;
pub mod enums;
pub mod filters;
pub mod lenient;
pub mod patient;
pub mod research;
pub mod tooth_diagnosis;
pub mod treatment;

pub use appointment::*;
pub use clinical_data::*;
pub use consultation::*;
pub use filters::*;
pub use patient::*;
pub use research::*;
pub use tooth_diagnosis::*;
pub use treatment::*;
