use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::{Entity, EntityKind, FormMode, default_active, is_blank};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Patient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "tipoDocumentoId", default)]
    pub document_type_id: i64,
    /// Filled in by the backend on reads; ignored on writes.
    #[serde(
        rename = "tipoDocumentoNombre",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub document_type_name: Option<String>,
    #[serde(rename = "numeroDocumento")]
    pub document_number: String,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

impl Patient {
    /// Blank template whose document type defaults to the first active one.
    pub fn blank_with_document_type(document_type_id: Option<i64>) -> Self {
        Self {
            document_type_id: document_type_id.unwrap_or(0),
            ..Self::blank()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Patient {
    const KIND: EntityKind = EntityKind::Patient;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn blank() -> Self {
        Self {
            id: None,
            first_name: String::new(),
            last_name: String::new(),
            document_type_id: 0,
            document_type_name: None,
            document_number: String::new(),
            active: true,
        }
    }

    fn missing_fields(&self, _mode: FormMode) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.first_name) {
            missing.push("nombre");
        }
        if is_blank(&self.last_name) {
            missing.push("apellido");
        }
        if self.document_type_id <= 0 {
            missing.push("tipoDocumentoId");
        }
        if is_blank(&self.document_number) {
            missing.push("numeroDocumento");
        }
        missing
    }

    fn form_fields() -> &'static [&'static str] {
        &["nombre", "apellido", "tipoDocumentoId", "numeroDocumento"]
    }
}

/// One professional and the patients assigned to them, as returned by the
/// admin overview endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfessionalPatients {
    pub profesional_id: i64,
    pub profesional_nombre: String,
    pub profesional_apellido: String,
    #[serde(default)]
    pub profesional_nombre_usuario: String,
    #[serde(default)]
    pub profesional_profesion: String,
    #[serde(default)]
    pub profesional_tipo_terapia: String,
    #[serde(default)]
    pub pacientes: Vec<Patient>,
}

impl ProfessionalPatients {
    pub fn professional_full_name(&self) -> String {
        format!("{} {}", self.profesional_nombre, self.profesional_apellido)
    }
}
