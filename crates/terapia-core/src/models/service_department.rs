use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::{Entity, EntityKind, FormMode, default_active, is_blank};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServiceDepartment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "abreviacion")]
    pub abbreviation: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

impl Entity for ServiceDepartment {
    const KIND: EntityKind = EntityKind::ServiceDepartment;

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
            abbreviation: String::new(),
            name: String::new(),
            active: true,
        }
    }

    fn missing_fields(&self, _mode: FormMode) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.abbreviation) {
            missing.push("abreviacion");
        }
        if is_blank(&self.name) {
            missing.push("nombre");
        }
        missing
    }

    fn form_fields() -> &'static [&'static str] {
        &["abreviacion", "nombre", "activo"]
    }
}
