use std::marker::PhantomData;

use terapia_core::api_paths;
use terapia_core::entity::Entity;
use terapia_core::models::auth::{AuthResponse, LoginRequest};
use terapia_core::models::patient::{Patient, ProfessionalPatients};
use terapia_core::models::therapy_session::TherapySession;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::{ApiRequest, Method};

/// CRUD endpoints of one entity resource.
pub struct EntityApi<E> {
    client: ApiClient,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityApi<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityApi<E> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<E>, ApiError> {
        self.client
            .get_json(ApiRequest::get(api_paths::collection(E::KIND)))
            .await
    }

    /// Only records whose `activo` flag is set.
    pub async fn list_active(&self) -> Result<Vec<E>, ApiError> {
        self.client
            .get_json(ApiRequest::get(api_paths::active(E::KIND)))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<E, ApiError> {
        self.client
            .get_json(ApiRequest::get(api_paths::item(E::KIND, id)))
            .await
    }

    /// Returns the stored record when the backend echoes it back.
    pub async fn create(&self, entity: &E) -> Result<Option<E>, ApiError> {
        self.client
            .send_json(Method::Post, api_paths::collection(E::KIND), entity)
            .await
    }

    pub async fn update(&self, id: i64, entity: &E) -> Result<Option<E>, ApiError> {
        self.client
            .send_json(Method::Put, api_paths::item(E::KIND, id), entity)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(api_paths::item(E::KIND, id)).await
    }
}

impl EntityApi<Patient> {
    /// Exact lookup by document number. A 404 means no such patient.
    pub async fn by_document(&self, document: &str) -> Result<Patient, ApiError> {
        self.client
            .get_json(ApiRequest::get(api_paths::patient_by_document(document)))
            .await
    }

    /// Substring search; blank criteria are left out of the query.
    pub async fn search(
        &self,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Vec<Patient>, ApiError> {
        let mut request = ApiRequest::get(api_paths::PATIENT_SEARCH);
        if let Some(name) = first_name.map(str::trim).filter(|s| !s.is_empty()) {
            request = request.with_query("nombre", name);
        }
        if let Some(surname) = last_name.map(str::trim).filter(|s| !s.is_empty()) {
            request = request.with_query("apellido", surname);
        }
        self.client.get_json(request).await
    }

    pub async fn grouped_by_professional(&self) -> Result<Vec<ProfessionalPatients>, ApiError> {
        self.client
            .get_json(ApiRequest::get(api_paths::PATIENTS_BY_PROFESSIONAL))
            .await
    }
}

impl EntityApi<TherapySession> {
    pub async fn by_patient(&self, patient_id: i64) -> Result<Vec<TherapySession>, ApiError> {
        self.client
            .get_json(ApiRequest::get(api_paths::sessions_by_patient(patient_id)))
            .await
    }

    pub async fn by_professional(
        &self,
        professional_id: i64,
    ) -> Result<Vec<TherapySession>, ApiError> {
        self.client
            .get_json(ApiRequest::get(api_paths::sessions_by_professional(
                professional_id,
            )))
            .await
    }
}

/// The login endpoint. Needs no bearer token.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        tracing::info!(username = %request.username, "initiating login");
        self.client
            .send_json(Method::Post, api_paths::LOGIN, request)
            .await?
            .ok_or_else(|| ApiError::Backend {
                status: 200,
                message: Some("login response was empty".to_string()),
            })
    }
}
