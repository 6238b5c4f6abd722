use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use terapia_api::error::{CANNOT_REACH_SERVER, SIGN_IN_AGAIN, extract_message};
use terapia_api::transport::BoxFuture;
use terapia_api::{
    ApiClient, ApiError, ApiRequest, EntityApi, Method, RawResponse, TokenProvider, Transport,
    TransportError,
};
use terapia_core::models::document_type::DocumentType;
use terapia_core::models::patient::Patient;
use terapia_core::models::therapy_session::TherapySession;

#[derive(Default)]
struct Recorder {
    requests: Mutex<Vec<ApiRequest>>,
    replies: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
}

impl Recorder {
    fn reply(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    fn fail(&self, reason: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(TransportError(reason.to_string())));
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for Recorder {
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

struct FixedToken(&'static str);

impl TokenProvider for FixedToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.to_string())
    }
}

#[test]
fn message_fields_in_preference_order() {
    assert_eq!(
        extract_message(br#"{"message":"c","error":"b","mensaje":"a"}"#).as_deref(),
        Some("a")
    );
    assert_eq!(
        extract_message(br#"{"message":"c","error":"b"}"#).as_deref(),
        Some("b")
    );
    assert_eq!(
        extract_message(br#"{"mensaje":"  ","message":"c"}"#).as_deref(),
        Some("c")
    );
    assert_eq!(extract_message(b"<html>oops</html>"), None);
}

#[test]
fn user_messages_follow_taxonomy() {
    assert_eq!(
        ApiError::from_status(401, b"").user_message("fallback"),
        SIGN_IN_AGAIN
    );
    assert_eq!(
        ApiError::from_status(403, br#"{"mensaje":"forbidden"}"#).user_message("fallback"),
        SIGN_IN_AGAIN
    );
    assert_eq!(
        ApiError::Connectivity("refused".into()).user_message("fallback"),
        CANNOT_REACH_SERVER
    );
    assert_eq!(
        ApiError::from_status(409, br#"{"mensaje":"Ya existe"}"#).user_message("fallback"),
        "Ya existe"
    );
    assert_eq!(
        ApiError::from_status(500, b"").user_message("fallback"),
        "fallback"
    );
    assert!(ApiError::from_status(404, b"").is_not_found());
}

#[tokio::test]
async fn list_attaches_bearer_and_decodes() {
    let transport = Arc::new(Recorder::default());
    transport.reply(200, r#"[{"id":1,"nombre":"RUT","descripcion":"","activo":true}]"#);

    let client = ApiClient::new(transport.clone()).with_token_provider(Arc::new(FixedToken("t0k")));
    let api: EntityApi<DocumentType> = EntityApi::new(client);
    let items = api.list().await.unwrap();

    assert_eq!(items.len(), 1);
    let sent = transport.requests();
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(sent[0].path, "/tipos-documento");
    assert_eq!(sent[0].bearer.as_deref(), Some("t0k"));
}

#[tokio::test]
async fn update_with_empty_body_is_none() {
    let transport = Arc::new(Recorder::default());
    transport.reply(204, "");

    let api: EntityApi<DocumentType> = EntityApi::new(ApiClient::new(transport.clone()));
    let draft = DocumentType {
        id: Some(4),
        name: "PASAPORTE".into(),
        description: String::new(),
        active: false,
    };
    assert!(api.update(4, &draft).await.unwrap().is_none());

    let sent = transport.requests();
    assert_eq!(sent[0].method, Method::Put);
    assert_eq!(sent[0].path, "/tipos-documento/4");
    assert_eq!(sent[0].body.as_ref().unwrap()["activo"], false);
}

#[tokio::test]
async fn patient_search_skips_blank_criteria() {
    let transport = Arc::new(Recorder::default());
    transport.reply(200, "[]");

    let api: EntityApi<Patient> = EntityApi::new(ApiClient::new(transport.clone()));
    let found = api.search(Some("  "), Some(" Pérez ")).await.unwrap();

    assert!(found.is_empty());
    let sent = transport.requests();
    assert_eq!(sent[0].path, "/pacientes/buscar");
    assert_eq!(
        sent[0].query,
        vec![("apellido".to_string(), "Pérez".to_string())]
    );
}

#[tokio::test]
async fn transport_failure_is_connectivity() {
    let transport = Arc::new(Recorder::default());
    transport.fail("connection refused");

    let api: EntityApi<Patient> = EntityApi::new(ApiClient::new(transport));
    let err = api.by_document("123").await.unwrap_err();
    assert!(matches!(err, ApiError::Connectivity(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn single_record_and_professional_sessions() {
    let transport = Arc::new(Recorder::default());
    transport.reply(200, r#"{"id":4,"nombre":"PASAPORTE","descripcion":"","activo":false}"#);
    transport.reply(
        200,
        r#"[{"id":9,"pacienteId":2,"profesionalId":7,"fecha":"2025-03-14T10:30:00","servicioDepartamentoId":1}]"#,
    );

    let client = ApiClient::new(transport.clone());
    let document_type = EntityApi::<DocumentType>::new(client.clone()).get(4).await.unwrap();
    assert_eq!(document_type.name, "PASAPORTE");
    assert!(!document_type.active);

    let sessions = EntityApi::<TherapySession>::new(client)
        .by_professional(7)
        .await
        .unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].patient_id, 2);

    let sent = transport.requests();
    assert_eq!(sent[0].path, "/tipos-documento/4");
    assert_eq!(sent[1].path, "/terapias/profesional/7");
}
