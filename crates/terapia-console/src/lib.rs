//! terapia-console
//!
//! Controllers behind the clinic admin console: generic list and form
//! state for every entity, the patient directory, and role-aware
//! navigation. The binary drives them from the command line.

pub mod config;
pub mod confirm;
pub mod fields;
pub mod form;
pub mod list_store;
pub mod messages;
pub mod notice;
pub mod patients;
pub mod router;
pub mod state;
pub mod summary;

pub use crate::form::{EntityFormController, SubmitOutcome};
pub use crate::list_store::{EntityListStore, ListState, LoadOutcome, ToggleOutcome, ToggleState};
pub use crate::notice::Notice;
pub use crate::state::ConsoleState;
