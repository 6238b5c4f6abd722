//! One-line renderings of records for terminal output.

use terapia_core::models::document_type::DocumentType;
use terapia_core::models::patient::Patient;
use terapia_core::models::professional::Professional;
use terapia_core::models::service_department::ServiceDepartment;
use terapia_core::models::therapy_session::TherapySession;
use terapia_core::models::therapy_type::TherapyType;

pub trait Summary {
    fn summary(&self) -> String;
}

fn id_column(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

fn status(active: bool) -> &'static str {
    if active { "active" } else { "inactive" }
}

impl Summary for Professional {
    fn summary(&self) -> String {
        format!(
            "{:>5}  {}  ({})  {} / {}  [{}]",
            id_column(self.id),
            self.full_name(),
            self.username,
            self.profession,
            self.therapy_type,
            status(self.active)
        )
    }
}

impl Summary for Patient {
    fn summary(&self) -> String {
        let document_type = self.document_type_name.as_deref().unwrap_or("doc");
        format!(
            "{:>5}  {}  {document_type} {}  [{}]",
            id_column(self.id),
            self.full_name(),
            self.document_number,
            status(self.active)
        )
    }
}

impl Summary for DocumentType {
    fn summary(&self) -> String {
        format!(
            "{:>5}  {}  {}  [{}]",
            id_column(self.id),
            self.name,
            self.description,
            status(self.active)
        )
    }
}

impl Summary for TherapyType {
    fn summary(&self) -> String {
        format!(
            "{:>5}  {}  {}  [{}]",
            id_column(self.id),
            self.name,
            self.formatted_unit_value(),
            status(self.active)
        )
    }
}

impl Summary for ServiceDepartment {
    fn summary(&self) -> String {
        format!(
            "{:>5}  {}  {}  [{}]",
            id_column(self.id),
            self.abbreviation,
            self.name,
            status(self.active)
        )
    }
}

impl Summary for TherapySession {
    fn summary(&self) -> String {
        let patient = self
            .patient_full_name()
            .unwrap_or_else(|| format!("patient #{}", self.patient_id));
        let service = self
            .servicio_departamento_abreviacion
            .as_deref()
            .or(self.servicio_departamento_nombre.as_deref())
            .unwrap_or("-");
        format!(
            "{:>5}  {}  {patient}  {service}  [{}]",
            id_column(self.id),
            self.date,
            status(self.active)
        )
    }
}
