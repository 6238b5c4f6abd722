//! REST path conventions.
//!
//! Pure string functions with no HTTP dependency. These define the canonical
//! layout of the clinic backend's resources, relative to the API base URL
//! (e.g. `http://localhost:8080/api`).

use crate::entity::EntityKind;

pub fn collection(kind: EntityKind) -> String {
    format!("/{}", kind.base_path())
}

pub fn item(kind: EntityKind, id: i64) -> String {
    format!("/{}/{id}", kind.base_path())
}

pub fn active(kind: EntityKind) -> String {
    format!("/{}/activos", kind.base_path())
}

/// The document number is percent-encoded as a single path segment.
pub fn patient_by_document(document: &str) -> String {
    format!("/pacientes/documento/{}", path_segment(document))
}

fn path_segment(raw: &str) -> String {
    // form encoding turns spaces into `+`, which a path would keep literally
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub const PATIENT_SEARCH: &str = "/pacientes/buscar";

pub const PATIENTS_BY_PROFESSIONAL: &str = "/pacientes/por-profesional";

pub fn sessions_by_patient(patient_id: i64) -> String {
    format!("/terapias/paciente/{patient_id}")
}

pub fn sessions_by_professional(professional_id: i64) -> String {
    format!("/terapias/profesional/{professional_id}")
}

pub const LOGIN: &str = "/auth/login";

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
