//! User-facing strings shared by every entity screen.

use terapia_core::entity::EntityKind;

pub const REQUIRED_FIELDS: &str = "Please complete all required fields";

fn capitalized(kind: EntityKind) -> String {
    let label = kind.label();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn load_failed(kind: EntityKind) -> String {
    format!("Error loading the {}", kind.plural())
}

pub fn create_failed(kind: EntityKind) -> String {
    format!("Error creating the {}", kind.label())
}

pub fn update_failed(kind: EntityKind) -> String {
    format!("Error updating the {}", kind.label())
}

pub fn delete_failed(kind: EntityKind) -> String {
    format!("Error deleting the {}", kind.label())
}

pub fn status_change_failed(kind: EntityKind) -> String {
    format!("Error changing the status of the {}", kind.label())
}

pub fn created(kind: EntityKind) -> String {
    format!("{} created successfully", capitalized(kind))
}

pub fn updated(kind: EntityKind) -> String {
    format!("{} updated successfully", capitalized(kind))
}

pub fn deleted(kind: EntityKind) -> String {
    format!("{} deleted successfully", capitalized(kind))
}

pub fn status_changed(kind: EntityKind, active: bool) -> String {
    let state = if active { "activated" } else { "deactivated" };
    format!("{} {state}", capitalized(kind))
}

pub fn delete_prompt(kind: EntityKind) -> String {
    format!("Are you sure you want to delete this {}?", kind.label())
}
