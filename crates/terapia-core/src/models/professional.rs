use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::{Entity, EntityKind, FormMode, default_active, is_blank};

/// A clinician with a console login.
///
/// `password` is write-only: the backend never returns it, and an edit draft
/// starts without one. It is only sent when the user typed a new value.
#[derive(Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Professional {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "nombreUsuario")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "profesion")]
    pub profession: String,
    #[serde(rename = "tipoTerapia")]
    pub therapy_type: String,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

impl Professional {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !is_blank(p))
    }
}

impl fmt::Debug for Professional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Professional")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("profession", &self.profession)
            .field("therapy_type", &self.therapy_type)
            .field("active", &self.active)
            .finish()
    }
}

impl Entity for Professional {
    const KIND: EntityKind = EntityKind::Professional;

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
            username: String::new(),
            password: Some(String::new()),
            profession: String::new(),
            therapy_type: String::new(),
            active: true,
        }
    }

    fn missing_fields(&self, mode: FormMode) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.first_name) {
            missing.push("nombre");
        }
        if is_blank(&self.last_name) {
            missing.push("apellido");
        }
        if is_blank(&self.username) {
            missing.push("nombreUsuario");
        }
        // Required on create only; an empty password on edit keeps the old one.
        if mode == FormMode::Create && !self.has_password() {
            missing.push("password");
        }
        if is_blank(&self.profession) {
            missing.push("profesion");
        }
        if is_blank(&self.therapy_type) {
            missing.push("tipoTerapia");
        }
        missing
    }

    fn form_fields() -> &'static [&'static str] {
        &[
            "nombre",
            "apellido",
            "nombreUsuario",
            "password",
            "profesion",
            "tipoTerapia",
            "activo",
        ]
    }

    /// Usernames are upper-cased and passwords lower-cased, both trimmed.
    fn normalized(&self, mode: FormMode) -> Self {
        let password = self
            .password
            .as_deref()
            .map(|p| p.trim().to_lowercase())
            .unwrap_or_default();
        let password = match mode {
            FormMode::Create => Some(password),
            FormMode::Edit if password.is_empty() => None,
            FormMode::Edit => Some(password),
        };

        Self {
            username: self.username.trim().to_uppercase(),
            password,
            ..self.clone()
        }
    }

    fn for_edit(&self) -> Self {
        Self {
            password: Some(String::new()),
            ..self.clone()
        }
    }
}
