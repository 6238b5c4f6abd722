//! The uniform CRUD contract shared by every admin screen.
//!
//! Each record type describes its blank form template, its required fields,
//! and how a draft is normalised before it is sent. The console's list and
//! form controllers are generic over [`Entity`] and never special-case a
//! concrete type.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EntityKind {
    Professional,
    Patient,
    DocumentType,
    TherapyType,
    ServiceDepartment,
    TherapySession,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Professional,
        EntityKind::Patient,
        EntityKind::DocumentType,
        EntityKind::TherapyType,
        EntityKind::ServiceDepartment,
        EntityKind::TherapySession,
    ];

    /// Path segment of the resource under the API base URL.
    pub fn base_path(self) -> &'static str {
        match self {
            EntityKind::Professional => "profesionales",
            EntityKind::Patient => "pacientes",
            EntityKind::DocumentType => "tipos-documento",
            EntityKind::TherapyType => "tipos-terapia",
            EntityKind::ServiceDepartment => "servicios-departamentos",
            EntityKind::TherapySession => "terapias",
        }
    }

    /// Singular, lower-case label used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Professional => "professional",
            EntityKind::Patient => "patient",
            EntityKind::DocumentType => "document type",
            EntityKind::TherapyType => "therapy type",
            EntityKind::ServiceDepartment => "service/department",
            EntityKind::TherapySession => "therapy session",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Professional => "professionals",
            EntityKind::Patient => "patients",
            EntityKind::DocumentType => "document types",
            EntityKind::TherapyType => "therapy types",
            EntityKind::ServiceDepartment => "services/departments",
            EntityKind::TherapySession => "therapy sessions",
        }
    }

    /// Short identifier accepted on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Professional => "professionals",
            EntityKind::Patient => "patients",
            EntityKind::DocumentType => "document-types",
            EntityKind::TherapyType => "therapy-types",
            EntityKind::ServiceDepartment => "service-departments",
            EntityKind::TherapySession => "sessions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|k| k.slug() == wanted || k.base_path() == wanted)
            .ok_or_else(|| CoreError::UnknownEntityKind(s.to_string()))
    }
}

/// Whether a form is creating a new record or editing a persisted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FormMode {
    Create,
    Edit,
}

/// A record managed through the uniform CRUD contract.
///
/// Identifiers are assigned by the backend only; `id()` is `None` until the
/// record has been persisted.
pub trait Entity:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    fn id(&self) -> Option<i64>;

    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// Blank form template with the entity's default field values.
    fn blank() -> Self;

    /// Wire names of the required fields that are missing or invalid.
    fn missing_fields(&self, mode: FormMode) -> Vec<&'static str>;

    /// Every field the form exposes, in display order.
    fn form_fields() -> &'static [&'static str];

    fn validate(&self, mode: FormMode) -> Result<(), CoreError> {
        let missing = self.missing_fields(mode);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::MissingFields(missing))
        }
    }

    /// The payload actually sent for a validated draft.
    fn normalized(&self, _mode: FormMode) -> Self {
        self.clone()
    }

    /// Draft seeded from a persisted record when an edit form opens.
    fn for_edit(&self) -> Self {
        self.clone()
    }

    /// View-level ordering applied after every successful load.
    /// Backend order is kept unless an entity overrides this.
    fn sort_for_display(_items: &mut [Self]) {}
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn default_active() -> bool {
    true
}
