pub mod auth;
pub mod document_type;
pub mod patient;
pub mod professional;
pub mod service_department;
pub mod therapy_session;
pub mod therapy_type;
