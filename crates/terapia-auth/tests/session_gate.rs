use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use terapia_api::error::CANNOT_REACH_SERVER;
use terapia_api::transport::BoxFuture;
use terapia_api::{
    ApiClient, ApiRequest, AuthApi, RawResponse, TokenProvider, Transport, TransportError,
};
use terapia_auth::error::{AuthError, INVALID_CREDENTIALS, MISSING_CREDENTIALS};
use terapia_auth::gate::{SessionGate, TOKEN_KEY, USER_KEY};
use terapia_auth::guard::{Guard, GuardDecision, Redirect};
use terapia_storage::kv::{FileStore, KeyValueStore, MemoryStore};

#[derive(Default)]
struct Backend {
    requests: Mutex<Vec<ApiRequest>>,
    replies: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
}

impl Backend {
    fn reply(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for Backend {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<RawResponse, TransportError>> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted reply".to_string())));
        Box::pin(async move { reply })
    }
}

const ADMIN_LOGIN: &str = r#"{
    "token": "jwt-admin",
    "type": "Bearer",
    "id": 1,
    "username": "ADMIN",
    "email": "admin@clinica.cl",
    "nombreCompleto": "Administradora General",
    "roles": ["ADMIN"]
}"#;

const STAFF_LOGIN: &str = r#"{
    "token": "jwt-staff",
    "username": "ANA.LOPEZ",
    "roles": ["PROFESIONAL"]
}"#;

fn gate_with(backend: &Arc<Backend>, store: Arc<dyn KeyValueStore>) -> SessionGate {
    SessionGate::new(AuthApi::new(ApiClient::new(backend.clone())), store)
}

#[tokio::test]
async fn admin_login_then_logout_flips_admin_route() {
    let backend = Arc::new(Backend::default());
    backend.reply(200, ADMIN_LOGIN);
    let gate = gate_with(&backend, Arc::new(MemoryStore::default()));

    assert_eq!(
        Guard::Admin.check(&gate.current(), "/profesionales"),
        GuardDecision::Redirect(Redirect::login_resuming("/profesionales"))
    );

    let outcome = gate.login("x", "y").await.unwrap();
    assert_eq!(outcome.landing, "/profesionales");
    assert!(gate.is_admin());
    assert_eq!(
        Guard::Admin.check(&gate.current(), "/profesionales"),
        GuardDecision::Allow
    );
    assert_eq!(gate.current().display_name(), "Administradora General");

    let redirect = gate.logout();
    assert_eq!(redirect, Redirect::login());
    assert!(!gate.is_authenticated());
    assert!(matches!(
        Guard::Admin.check(&gate.current(), "/profesionales"),
        GuardDecision::Redirect(_)
    ));
}

#[tokio::test]
async fn staff_is_authenticated_but_not_admin() {
    let backend = Arc::new(Backend::default());
    backend.reply(200, STAFF_LOGIN);
    let gate = gate_with(&backend, Arc::new(MemoryStore::default()));

    let outcome = gate.login("ana.lopez", "secret1").await.unwrap();
    assert_eq!(outcome.landing, "/terapias");
    assert!(gate.is_authenticated());
    assert!(!gate.is_admin());
    assert_eq!(gate.current().display_name(), "ANA.LOPEZ");

    assert_eq!(
        Guard::Authenticated.check(&gate.current(), "/pacientes"),
        GuardDecision::Allow
    );
    let decision = Guard::Admin.check(&gate.current(), "/admin/servicios-departamentos");
    let GuardDecision::Redirect(redirect) = decision else {
        panic!("expected redirect");
    };
    assert_eq!(
        redirect.href(),
        "/login?returnUrl=%2Fadmin%2Fservicios-departamentos"
    );
}

#[tokio::test]
async fn rejected_login_persists_nothing() {
    let backend = Arc::new(Backend::default());
    backend.reply(401, r#"{"mensaje":"Credenciales inválidas"}"#);
    let store = Arc::new(MemoryStore::default());
    let gate = gate_with(&backend, store.clone());

    let err = gate.login("x", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials(_)));
    assert_eq!(err.user_message(), "Credenciales inválidas");
    assert!(!gate.is_authenticated());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(USER_KEY).unwrap(), None);
}

#[tokio::test]
async fn rejection_without_explanation_reads_as_invalid_credentials() {
    let backend = Arc::new(Backend::default());
    backend.reply(401, "");
    backend.reply(403, "");
    backend.reply(500, r#"{"error":"Usuario bloqueado"}"#);
    let gate = gate_with(&backend, Arc::new(MemoryStore::default()));

    let err = gate.login("x", "wrong").await.unwrap_err();
    assert_eq!(err.user_message(), INVALID_CREDENTIALS);

    let err = gate.login("x", "wrong").await.unwrap_err();
    assert_eq!(err.user_message(), INVALID_CREDENTIALS);

    let err = gate.login("x", "wrong").await.unwrap_err();
    assert_eq!(err.user_message(), "Usuario bloqueado");
}

#[tokio::test]
async fn unreachable_backend_is_not_reported_as_bad_credentials() {
    let backend = Arc::new(Backend::default());
    let gate = gate_with(&backend, Arc::new(MemoryStore::default()));

    let err = gate.login("x", "pw").await.unwrap_err();
    assert!(matches!(err, AuthError::Api(_)));
    assert_eq!(err.user_message(), CANNOT_REACH_SERVER);
}

#[tokio::test]
async fn minimal_login_response_is_enough_for_admin() {
    let backend = Arc::new(Backend::default());
    backend.reply(200, r#"{"token":"t","roles":["ADMIN"]}"#);
    let gate = gate_with(&backend, Arc::new(MemoryStore::default()));

    let outcome = gate.login("admin", "pw").await.unwrap();

    assert_eq!(outcome.landing, "/profesionales");
    assert!(gate.is_admin());
    assert_eq!(gate.bearer_token().as_deref(), Some("t"));
    assert_eq!(gate.current().display_name(), "");
}

#[tokio::test]
async fn blank_credentials_make_no_call() {
    let backend = Arc::new(Backend::default());
    let gate = gate_with(&backend, Arc::new(MemoryStore::default()));

    let err = gate.login("   ", "pw").await.unwrap_err();
    assert_eq!(err.user_message(), MISSING_CREDENTIALS);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let backend = Arc::new(Backend::default());
    backend.reply(200, ADMIN_LOGIN);

    {
        let gate = gate_with(&backend, Arc::new(FileStore::open(&path).unwrap()));
        gate.login("admin", "pw").await.unwrap();
    }

    let gate = gate_with(&backend, Arc::new(FileStore::open(&path).unwrap()));
    assert!(gate.is_admin());
    assert_eq!(gate.bearer_token().as_deref(), Some("jwt-admin"));

    gate.logout();
    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(reopened.get(USER_KEY).unwrap(), None);
}

#[tokio::test]
async fn unreadable_profile_is_ignored() {
    let store = Arc::new(MemoryStore::default());
    store
        .write_batch(&[(TOKEN_KEY, Some("tok")), (USER_KEY, Some("{broken"))])
        .unwrap();
    let gate = gate_with(&Arc::new(Backend::default()), store);

    assert!(gate.is_authenticated());
    assert!(!gate.is_admin());
}

#[tokio::test]
async fn observers_see_login_and_logout() {
    let backend = Arc::new(Backend::default());
    backend.reply(200, STAFF_LOGIN);
    let gate = gate_with(&backend, Arc::new(MemoryStore::default()));
    let mut rx = gate.subscribe();

    gate.login("ana", "pw").await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_authenticated());

    gate.logout();
    rx.changed().await.unwrap();
    assert!(!rx.borrow_and_update().is_authenticated());
}
