use std::sync::Arc;

use terapia_api::{ApiClient, AuthApi, EntityApi, Transport};
use terapia_auth::SessionGate;
use terapia_core::entity::Entity;
use terapia_storage::kv::KeyValueStore;

use crate::form::EntityFormController;
use crate::list_store::EntityListStore;
use crate::patients::PatientDirectory;
use crate::router::{self, Navigation};

/// Everything a console front end needs, wired over one transport and one
/// session store.
pub struct ConsoleState {
    pub gate: Arc<SessionGate>,
    client: ApiClient,
}

impl ConsoleState {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn KeyValueStore>) -> Self {
        let auth = AuthApi::new(ApiClient::new(Arc::clone(&transport)));
        let gate = Arc::new(SessionGate::new(auth, store));
        let client = ApiClient::new(transport).with_token_provider(gate.clone());
        Self { gate, client }
    }

    pub fn api<E: Entity>(&self) -> EntityApi<E> {
        EntityApi::new(self.client.clone())
    }

    pub fn list_store<E: Entity>(&self) -> Arc<EntityListStore<E>> {
        Arc::new(EntityListStore::new(self.api()))
    }

    /// Form whose successes reload `list`.
    pub fn form<E: Entity>(&self, list: &Arc<EntityListStore<E>>) -> EntityFormController<E> {
        EntityFormController::new(self.api()).with_list(Arc::clone(list))
    }

    pub fn patient_directory(&self) -> PatientDirectory {
        PatientDirectory::new(self.api(), self.api(), self.api())
    }

    pub fn navigate(&self, path: &str) -> Navigation {
        router::navigate(&self.gate.current(), path)
    }
}
