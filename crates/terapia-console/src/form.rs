//! Create/edit modal for one entity.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use terapia_api::EntityApi;
use terapia_core::entity::{Entity, FormMode};

use crate::list_store::EntityListStore;
use crate::messages;
use crate::notice::Notice;

#[derive(Debug, Clone, PartialEq)]
pub struct FormState<E> {
    pub open: bool,
    pub mode: FormMode,
    pub draft: Option<E>,
    /// Fields the user has interacted with.
    pub touched: BTreeSet<&'static str>,
    pub notice: Notice,
    pub pending: bool,
    /// Bumped on every open and close. A submit only writes back while it
    /// still matches.
    generation: u64,
}

impl<E> Default for FormState<E> {
    fn default() -> Self {
        Self {
            open: false,
            mode: FormMode::Create,
            draft: None,
            touched: BTreeSet::new(),
            notice: Notice::None,
            pending: false,
            generation: 0,
        }
    }
}

fn reset<E>(state: &mut FormState<E>, next: FormState<E>) {
    let generation = state.generation + 1;
    *state = FormState { generation, ..next };
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<E> {
    /// Stored. Carries the record when the backend echoed it back.
    Saved { mode: FormMode, record: Option<E> },
    /// Required fields missing; nothing was sent.
    Invalid(Vec<&'static str>),
    Failed(String),
    /// Another submit is still in flight.
    Ignored,
    /// No draft to submit.
    Closed,
}

/// Draft, validation and submission for the create/edit modal.
///
/// When a list store is attached, successes are announced on it and the
/// list is reloaded.
pub struct EntityFormController<E: Entity> {
    api: EntityApi<E>,
    list: Option<Arc<EntityListStore<E>>>,
    inner: Mutex<FormState<E>>,
}

impl<E: Entity> EntityFormController<E> {
    pub fn new(api: EntityApi<E>) -> Self {
        Self {
            api,
            list: None,
            inner: Mutex::new(FormState::default()),
        }
    }

    pub fn with_list(mut self, list: Arc<EntityListStore<E>>) -> Self {
        self.list = Some(list);
        self
    }

    fn lock(&self) -> MutexGuard<'_, FormState<E>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> FormState<E> {
        self.lock().clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    pub fn mode(&self) -> FormMode {
        self.lock().mode
    }

    pub fn draft(&self) -> Option<E> {
        self.lock().draft.clone()
    }

    pub fn notice(&self) -> Notice {
        self.lock().notice.clone()
    }

    pub fn open_create(&self) {
        self.open_create_with(E::blank());
    }

    /// Open in create mode with a pre-filled template.
    pub fn open_create_with(&self, template: E) {
        self.open(FormMode::Create, template);
    }

    pub fn open_edit(&self, entity: &E) {
        self.open(FormMode::Edit, entity.for_edit());
    }

    fn open(&self, mode: FormMode, draft: E) {
        let mut state = self.lock();
        reset(
            &mut *state,
            FormState {
                open: true,
                mode,
                draft: Some(draft),
                ..FormState::default()
            },
        );
        tracing::debug!(entity = %E::KIND, ?mode, "form opened");
    }

    /// Close the modal and discard the draft.
    pub fn cancel(&self) {
        reset(&mut *self.lock(), FormState::default());
    }

    /// Edit the draft in place. Returns `false` when no form is open.
    pub fn update_draft(&self, edit: impl FnOnce(&mut E)) -> bool {
        match self.lock().draft.as_mut() {
            Some(draft) => {
                edit(draft);
                true
            }
            None => false,
        }
    }

    pub fn touch(&self, field: &'static str) {
        self.lock().touched.insert(field);
    }

    /// Whether `field` should show its inline "required" error.
    pub fn field_error(&self, field: &str) -> bool {
        let state = self.lock();
        let Some(draft) = state.draft.as_ref() else {
            return false;
        };
        state.touched.contains(field)
            && draft
                .missing_fields(state.mode)
                .iter()
                .any(|missing| *missing == field)
    }

    /// Validate, normalise and send the draft.
    pub async fn submit(&self) -> SubmitOutcome<E> {
        let (mode, payload, generation) = {
            let mut state = self.lock();
            if state.pending {
                tracing::debug!(entity = %E::KIND, "submit ignored, one already in flight");
                return SubmitOutcome::Ignored;
            }
            let mode = state.mode;
            let Some(draft) = state.draft.as_ref() else {
                return SubmitOutcome::Closed;
            };
            let missing = draft.missing_fields(mode);
            if !missing.is_empty() {
                state.touched.extend(E::form_fields().iter().copied());
                state.notice = Notice::Error(messages::REQUIRED_FIELDS.to_string());
                return SubmitOutcome::Invalid(missing);
            }
            let payload = draft.normalized(mode);
            state.pending = true;
            (mode, payload, state.generation)
        };

        let result = match (mode, payload.id()) {
            (FormMode::Edit, Some(id)) => self.api.update(id, &payload).await,
            _ => self.api.create(&payload).await,
        };

        match result {
            Ok(record) => {
                let success = match mode {
                    FormMode::Create => messages::created(E::KIND),
                    FormMode::Edit => messages::updated(E::KIND),
                };
                tracing::info!(entity = %E::KIND, ?mode, "record saved");
                {
                    let mut state = self.lock();
                    if state.generation == generation {
                        reset(&mut *state, FormState::default());
                        if self.list.is_none() {
                            state.notice = Notice::Success(success.clone());
                        }
                    } else {
                        tracing::debug!(entity = %E::KIND, "form reopened while saving, left as is");
                    }
                }
                if let Some(list) = &self.list {
                    list.announce_success(success);
                    list.reload().await;
                }
                SubmitOutcome::Saved { mode, record }
            }
            Err(e) => {
                tracing::warn!(entity = %E::KIND, ?mode, error = %e, "save failed");
                let fallback = match mode {
                    FormMode::Create => messages::create_failed(E::KIND),
                    FormMode::Edit => messages::update_failed(E::KIND),
                };
                let message = e.user_message(&fallback);
                let mut state = self.lock();
                if state.generation == generation {
                    state.pending = false;
                    state.notice = Notice::Error(message.clone());
                }
                SubmitOutcome::Failed(message)
            }
        }
    }
}
