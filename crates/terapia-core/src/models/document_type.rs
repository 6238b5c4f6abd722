use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::{Entity, EntityKind, FormMode, default_active, is_blank};

/// Identity document kind accepted for patients (national ID, passport, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

impl Entity for DocumentType {
    const KIND: EntityKind = EntityKind::DocumentType;

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
            name: String::new(),
            description: String::new(),
            active: true,
        }
    }

    fn missing_fields(&self, _mode: FormMode) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.name) {
            missing.push("nombre");
        }
        missing
    }

    fn form_fields() -> &'static [&'static str] {
        &["nombre", "descripcion", "activo"]
    }
}
