//! Collection state for one entity screen.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use terapia_api::EntityApi;
use terapia_core::entity::Entity;

use crate::confirm::Confirm;
use crate::messages;
use crate::notice::Notice;

/// How long a success message stays visible.
pub const SUCCESS_NOTICE_TTL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<E> {
    pub items: Vec<E>,
    pub loading: bool,
    pub notice: Notice,
}

impl<E> Default for ListState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            notice: Notice::None,
        }
    }
}

/// What happened to one reload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// A newer reload was issued before this one answered.
    Superseded,
}

/// Lifecycle of one optimistic status flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    /// Flipped locally, update in flight.
    Pending { original: bool },
    Committed { active: bool },
    /// Update rejected; the original flag is back in place.
    RolledBack { active: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Committed { active: bool },
    RolledBack { active: bool, message: String },
    /// The id is not in the list, or is already being toggled.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    Declined,
    Failed(String),
}

struct Inner<E> {
    state: ListState<E>,
    latest_request: u64,
    notice_generation: u64,
    toggles: HashMap<i64, ToggleState>,
}

impl<E> Inner<E> {
    /// Replace the notice. Returns the generation a delayed clear must match.
    fn set_notice(&mut self, notice: Notice) -> u64 {
        self.notice_generation += 1;
        self.state.notice = notice;
        self.notice_generation
    }
}

/// Owned list of records for one entity, kept in step with the backend.
///
/// All methods take `&self`; the lock is only held between awaits, so a
/// toggle and a reload may be in flight together.
pub struct EntityListStore<E: Entity> {
    api: EntityApi<E>,
    inner: Arc<Mutex<Inner<E>>>,
}

impl<E: Entity> EntityListStore<E> {
    pub fn new(api: EntityApi<E>) -> Self {
        Self {
            api,
            inner: Arc::new(Mutex::new(Inner {
                state: ListState::default(),
                latest_request: 0,
                notice_generation: 0,
                toggles: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        lock(&*self.inner)
    }

    pub fn snapshot(&self) -> ListState<E> {
        self.lock().state.clone()
    }

    pub fn items(&self) -> Vec<E> {
        self.lock().state.items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.loading
    }

    pub fn notice(&self) -> Notice {
        self.lock().state.notice.clone()
    }

    pub fn toggle_state(&self, id: i64) -> Option<ToggleState> {
        self.lock().toggles.get(&id).copied()
    }

    /// Fetch the whole collection and replace the items.
    pub async fn reload(&self) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = self.api.list().await;
        self.finish_load(ticket, result)
    }

    /// Like [`reload`](Self::reload), restricted to active records.
    pub async fn reload_active(&self) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = self.api.list_active().await;
        self.finish_load(ticket, result)
    }

    fn begin_load(&self) -> u64 {
        let mut inner = self.lock();
        inner.latest_request += 1;
        inner.state.items.clear();
        inner.state.loading = true;
        inner.latest_request
    }

    fn finish_load(
        &self,
        ticket: u64,
        result: Result<Vec<E>, terapia_api::ApiError>,
    ) -> LoadOutcome {
        let mut inner = self.lock();
        if ticket != inner.latest_request {
            tracing::debug!(entity = %E::KIND, ticket, "discarding stale list response");
            return LoadOutcome::Superseded;
        }
        inner.state.loading = false;

        match result {
            Ok(mut items) => {
                E::sort_for_display(&mut items);
                tracing::debug!(entity = %E::KIND, count = items.len(), "list loaded");
                inner.toggles.retain(|id, toggle| {
                    matches!(toggle, ToggleState::Pending { .. })
                        || items.iter().any(|item| item.id() == Some(*id))
                });
                inner.state.items = items;
                if inner.state.notice.is_error() {
                    inner.set_notice(Notice::None);
                }
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(entity = %E::KIND, error = %e, "failed to load list");
                inner.state.items.clear();
                let message = e.user_message(&messages::load_failed(E::KIND));
                inner.set_notice(Notice::Error(message));
                LoadOutcome::Failed
            }
        }
    }

    /// Optimistically flip `activo` on the record with `id`, send the whole
    /// flipped record, and roll back if the backend refuses.
    pub async fn toggle_active(&self, id: i64) -> ToggleOutcome {
        let flipped = {
            let mut inner = self.lock();
            if matches!(inner.toggles.get(&id), Some(ToggleState::Pending { .. })) {
                return ToggleOutcome::Skipped;
            }
            let Some(item) = inner.state.items.iter_mut().find(|e| e.id() == Some(id)) else {
                return ToggleOutcome::Skipped;
            };
            let original = item.is_active();
            item.set_active(!original);
            let flipped = item.clone();
            inner.toggles.insert(id, ToggleState::Pending { original });
            flipped
        };
        let active = flipped.is_active();

        match self.api.update(id, &flipped).await {
            Ok(_) => {
                {
                    let mut inner = self.lock();
                    inner.toggles.insert(id, ToggleState::Committed { active });
                }
                tracing::info!(entity = %E::KIND, id, active, "status changed");
                self.announce_success(messages::status_changed(E::KIND, active));
                self.reload().await;
                ToggleOutcome::Committed { active }
            }
            Err(e) => {
                tracing::warn!(entity = %E::KIND, id, error = %e, "status change rejected");
                let original = !active;
                let message = e.user_message(&messages::status_change_failed(E::KIND));
                let mut inner = self.lock();
                if let Some(item) = inner.state.items.iter_mut().find(|i| i.id() == Some(id)) {
                    item.set_active(original);
                }
                inner
                    .toggles
                    .insert(id, ToggleState::RolledBack { active: original });
                inner.set_notice(Notice::Error(message.clone()));
                ToggleOutcome::RolledBack {
                    active: original,
                    message,
                }
            }
        }
    }

    /// Delete after an explicit confirmation. Declining sends nothing.
    pub async fn remove(&self, id: i64, confirm: &dyn Confirm) -> RemoveOutcome {
        if !confirm.confirm(&messages::delete_prompt(E::KIND)) {
            tracing::debug!(entity = %E::KIND, id, "delete declined");
            return RemoveOutcome::Declined;
        }

        match self.api.delete(id).await {
            Ok(()) => {
                tracing::info!(entity = %E::KIND, id, "deleted");
                self.announce_success(messages::deleted(E::KIND));
                self.reload().await;
                RemoveOutcome::Deleted
            }
            Err(e) => {
                tracing::warn!(entity = %E::KIND, id, error = %e, "delete failed");
                let message = e.user_message(&messages::delete_failed(E::KIND));
                self.lock().set_notice(Notice::Error(message.clone()));
                RemoveOutcome::Failed(message)
            }
        }
    }

    /// Show a success message that clears itself after
    /// [`SUCCESS_NOTICE_TTL`] unless something replaced it first.
    pub fn announce_success(&self, message: String) {
        let generation = self.lock().set_notice(Notice::Success(message));
        schedule_clear(Arc::clone(&self.inner), generation);
    }
}

fn lock<E>(inner: &Mutex<Inner<E>>) -> MutexGuard<'_, Inner<E>> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn schedule_clear<E: Send + 'static>(inner: Arc<Mutex<Inner<E>>>, generation: u64) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        return;
    };
    handle.spawn(async move {
        tokio::time::sleep(SUCCESS_NOTICE_TTL).await;
        let mut guard = lock(&*inner);
        if guard.notice_generation == generation {
            guard.set_notice(Notice::None);
        }
    });
}
