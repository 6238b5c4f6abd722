//! The patients screen: grouped overview for admins, search and session
//! history for professionals.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use jiff::civil::Date;
use terapia_api::EntityApi;
use terapia_core::entity::{Entity, EntityKind, FormMode};
use terapia_core::models::document_type::DocumentType;
use terapia_core::models::patient::{Patient, ProfessionalPatients};
use terapia_core::models::therapy_session::{TherapySession, group_by_day};

use crate::form::{EntityFormController, SubmitOutcome};
use crate::messages;
use crate::notice::Notice;

pub const DOCUMENT_REQUIRED: &str = "Please enter a document number";
pub const NAME_REQUIRED: &str = "Please enter a name or surname to search";
pub const PATIENT_NOT_FOUND: &str = "Patient not found. You can create it with the form.";
pub const NO_MATCHES: &str = "No patients found. You can create a new one with the form.";
const SEARCH_FAILED: &str = "Error searching for the patient";
const NAME_SEARCH_FAILED: &str = "Error searching for patients";
const SESSIONS_FAILED: &str = "Error loading the patient's sessions";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    #[default]
    Idle,
    /// Several matches listed, none selected.
    Results,
    /// One patient selected, sessions shown.
    Selected,
    /// Nothing matched; the create form is open and pre-filled.
    CreationOffered,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryState {
    pub mode: SearchMode,
    pub searching: bool,
    pub results: Vec<Patient>,
    pub selected: Option<Patient>,
    /// Sessions of the selected patient, newest first.
    pub sessions: Vec<TherapySession>,
    pub notice: Notice,
    pub overview: Vec<ProfessionalPatients>,
    pub expanded: BTreeSet<i64>,
    pub document_types: Vec<DocumentType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Selected(Patient),
    Listed(usize),
    CreationOffered,
    Invalid,
    Failed(String),
}

pub struct PatientDirectory {
    patients: EntityApi<Patient>,
    sessions: EntityApi<TherapySession>,
    document_types: EntityApi<DocumentType>,
    form: EntityFormController<Patient>,
    inner: Mutex<DirectoryState>,
}

impl PatientDirectory {
    pub fn new(
        patients: EntityApi<Patient>,
        sessions: EntityApi<TherapySession>,
        document_types: EntityApi<DocumentType>,
    ) -> Self {
        Self {
            form: EntityFormController::new(patients.clone()),
            patients,
            sessions,
            document_types,
            inner: Mutex::new(DirectoryState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DirectoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> DirectoryState {
        self.lock().clone()
    }

    pub fn notice(&self) -> Notice {
        self.lock().notice.clone()
    }

    /// The create/edit form for patients.
    pub fn form(&self) -> &EntityFormController<Patient> {
        &self.form
    }

    /// Admin view: every professional with their patients, all expanded.
    pub async fn load_overview(&self) {
        self.lock().notice = Notice::None;
        match self.patients.grouped_by_professional().await {
            Ok(groups) => {
                let mut state = self.lock();
                state.expanded = groups.iter().map(|g| g.profesional_id).collect();
                state.overview = groups;
                tracing::debug!(groups = state.overview.len(), "patient overview loaded");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load patient overview");
                let mut state = self.lock();
                state.overview.clear();
                state.notice = Notice::Error(e.user_message(&messages::load_failed(EntityKind::Patient)));
            }
        }
    }

    pub fn toggle_expanded(&self, professional_id: i64) {
        let mut state = self.lock();
        if !state.expanded.remove(&professional_id) {
            state.expanded.insert(professional_id);
        }
    }

    pub fn is_expanded(&self, professional_id: i64) -> bool {
        self.lock().expanded.contains(&professional_id)
    }

    pub fn total_patients(&self) -> usize {
        self.lock().overview.iter().map(|g| g.pacientes.len()).sum()
    }

    /// Active document types for the form's selector.
    pub async fn load_document_types(&self) {
        match self.document_types.list_active().await {
            Ok(types) => self.lock().document_types = types,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load document types");
                self.lock().notice =
                    Notice::Error(messages::load_failed(EntityKind::DocumentType));
            }
        }
    }

    fn default_document_type(&self) -> Option<i64> {
        self.lock().document_types.first().and_then(|t| t.id)
    }

    pub fn open_create(&self) {
        self.form
            .open_create_with(Patient::blank_with_document_type(self.default_document_type()));
    }

    pub fn open_edit(&self, patient: &Patient) {
        self.form.open_edit(patient);
    }

    fn offer_creation(&self, message: &str, prefill: impl FnOnce(&mut Patient)) {
        let mut template = Patient::blank_with_document_type(self.default_document_type());
        prefill(&mut template);
        self.form.open_create_with(template);
        let mut state = self.lock();
        state.mode = SearchMode::CreationOffered;
        state.results.clear();
        state.selected = None;
        state.sessions.clear();
        state.notice = Notice::Error(message.to_string());
    }

    fn begin_search(&self) {
        let mut state = self.lock();
        state.searching = true;
        state.notice = Notice::None;
        state.results.clear();
    }

    /// Exact lookup. A 404 offers to create the patient instead.
    pub async fn search_by_document(&self, document: &str) -> SearchOutcome {
        let document = document.trim();
        if document.is_empty() {
            self.lock().notice = Notice::Error(DOCUMENT_REQUIRED.to_string());
            return SearchOutcome::Invalid;
        }

        self.begin_search();
        let result = self.patients.by_document(document).await;
        self.lock().searching = false;

        match result {
            Ok(patient) => {
                self.lock().results = vec![patient.clone()];
                self.select(&patient).await;
                SearchOutcome::Selected(patient)
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(document, "no patient with that document, offering creation");
                self.offer_creation(PATIENT_NOT_FOUND, |p| {
                    p.document_number = document.to_string();
                });
                SearchOutcome::CreationOffered
            }
            Err(e) => {
                tracing::warn!(error = %e, "patient lookup failed");
                let message = e.user_message(SEARCH_FAILED);
                self.lock().notice = Notice::Error(message.clone());
                SearchOutcome::Failed(message)
            }
        }
    }

    /// Substring search on name and surname; at least one is required.
    pub async fn search_by_name(&self, first_name: &str, last_name: &str) -> SearchOutcome {
        let (first_name, last_name) = (first_name.trim(), last_name.trim());
        if first_name.is_empty() && last_name.is_empty() {
            self.lock().notice = Notice::Error(NAME_REQUIRED.to_string());
            return SearchOutcome::Invalid;
        }

        self.begin_search();
        let result = self
            .patients
            .search(Some(first_name), Some(last_name))
            .await;
        self.lock().searching = false;

        match result {
            Ok(found) => match found.len() {
                0 => {
                    self.offer_creation(NO_MATCHES, |p| {
                        p.first_name = first_name.to_string();
                        p.last_name = last_name.to_string();
                    });
                    SearchOutcome::CreationOffered
                }
                1 => {
                    let only = found[0].clone();
                    self.lock().results = found;
                    self.select(&only).await;
                    SearchOutcome::Selected(only)
                }
                count => {
                    let mut state = self.lock();
                    state.results = found;
                    state.selected = None;
                    state.sessions.clear();
                    state.mode = SearchMode::Results;
                    SearchOutcome::Listed(count)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "patient search failed");
                let message = e.user_message(NAME_SEARCH_FAILED);
                self.lock().notice = Notice::Error(message.clone());
                SearchOutcome::Failed(message)
            }
        }
    }

    /// Make `patient` the current one and load its session history.
    pub async fn select(&self, patient: &Patient) {
        {
            let mut state = self.lock();
            state.selected = Some(patient.clone());
            state.sessions.clear();
            state.mode = SearchMode::Selected;
        }
        self.form.cancel();
        if let Some(id) = patient.id {
            self.load_sessions(id).await;
        }
    }

    async fn load_sessions(&self, patient_id: i64) {
        match self.sessions.by_patient(patient_id).await {
            Ok(mut sessions) => {
                TherapySession::sort_for_display(&mut sessions);
                let mut state = self.lock();
                if state.selected.as_ref().and_then(|p| p.id) == Some(patient_id) {
                    state.sessions = sessions;
                }
            }
            Err(e) => {
                tracing::warn!(patient_id, error = %e, "failed to load sessions");
                self.lock().notice = Notice::Error(SESSIONS_FAILED.to_string());
            }
        }
    }

    /// Sessions of the selected patient grouped by calendar day, most
    /// recent day first.
    pub fn sessions_by_day(&self) -> Vec<(Date, Vec<TherapySession>)> {
        group_by_day(&self.lock().sessions)
    }

    /// Submit the patient form and update the view with the result.
    pub async fn save(&self) -> SubmitOutcome<Patient> {
        let outcome = self.form.submit().await;
        if let SubmitOutcome::Saved { mode, record } = &outcome {
            let success = match mode {
                FormMode::Create => messages::created(EntityKind::Patient),
                FormMode::Edit => messages::updated(EntityKind::Patient),
            };
            match (mode, record) {
                (FormMode::Edit, Some(patient)) => self.select(patient).await,
                (FormMode::Create, Some(patient)) => {
                    let mut state = self.lock();
                    state.results = vec![patient.clone()];
                    state.selected = None;
                    state.sessions.clear();
                    state.mode = SearchMode::Results;
                }
                _ => {}
            }
            self.lock().notice = Notice::Success(success);
        }
        outcome
    }
}
