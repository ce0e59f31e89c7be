pub mod conditions;
pub mod patient;

pub use conditions::extract_conditions;
pub use patient::PatientService;
