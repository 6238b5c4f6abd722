mod common;

use std::sync::Arc;

use serde_json::json;

use common::{FakeBackend, entity_api, response};
use terapia_api::Method;
use terapia_console::messages::REQUIRED_FIELDS;
use terapia_console::{EntityFormController, EntityListStore, Notice, SubmitOutcome};
use terapia_core::entity::FormMode;
use terapia_core::models::document_type::DocumentType;
use terapia_core::models::professional::Professional;
use terapia_core::models::therapy_type::TherapyType;

fn professional_form(
    backend: &Arc<FakeBackend>,
) -> (EntityFormController<Professional>, Arc<EntityListStore<Professional>>) {
    let list = Arc::new(EntityListStore::new(entity_api(backend)));
    let form = EntityFormController::new(entity_api(backend)).with_list(Arc::clone(&list));
    (form, list)
}

fn existing_professional() -> Professional {
    Professional {
        id: Some(7),
        first_name: "Ana".to_string(),
        last_name: "Pérez".to_string(),
        username: "APEREZ".to_string(),
        password: Some("stored".to_string()),
        profession: "Kinesióloga".to_string(),
        therapy_type: "KINESIOLOGIA".to_string(),
        active: true,
    }
}

#[tokio::test]
async fn blank_document_type_is_rejected_without_a_request() {
    let backend = FakeBackend::new();
    let form: EntityFormController<DocumentType> = EntityFormController::new(entity_api(&backend));
    form.open_create();

    assert!(!form.field_error("nombre"), "untouched fields show no error");

    let outcome = form.submit().await;

    assert_eq!(outcome, SubmitOutcome::Invalid(vec!["nombre"]));
    assert!(backend.requests().is_empty());
    assert!(form.is_open());
    assert!(!form.is_pending());
    assert_eq!(form.notice().error(), REQUIRED_FIELDS);
    assert!(form.field_error("nombre"));
    assert!(!form.field_error("descripcion"));
}

#[tokio::test]
async fn touched_field_reports_its_error() {
    let backend = FakeBackend::new();
    let form: EntityFormController<DocumentType> = EntityFormController::new(entity_api(&backend));
    form.open_create();

    form.touch("nombre");
    assert!(form.field_error("nombre"));

    form.update_draft(|d| d.name = "RUT".to_string());
    assert!(!form.field_error("nombre"));
}

#[tokio::test]
async fn new_professional_is_normalised_before_sending() {
    let backend = FakeBackend::new();
    backend.status(201, r#"{"id": 11, "nombre": "Juan", "apellido": "Díaz", "nombreUsuario": "JDIAZ", "profesion": "Psicólogo", "tipoTerapia": "PSICOLOGIA", "activo": true}"#);
    backend.ok("[]");
    let (form, list) = professional_form(&backend);

    form.open_create();
    form.update_draft(|p| {
        p.first_name = "Juan".to_string();
        p.last_name = "Díaz".to_string();
        p.username = "  jdiaz ".to_string();
        p.password = Some(" Secreto1 ".to_string());
        p.profession = "Psicólogo".to_string();
        p.therapy_type = "PSICOLOGIA".to_string();
    });

    let outcome = form.submit().await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Saved {
            mode: FormMode::Create,
            record: Some(ref p),
        } if p.id == Some(11)
    ));
    let requests = backend.requests();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/profesionales");
    let body = requests[0].body.as_ref().unwrap();
    assert_eq!(body["nombreUsuario"], json!("JDIAZ"));
    assert_eq!(body["password"], json!("secreto1"));
    assert_eq!(body["activo"], json!(true));

    assert_eq!(requests[1].method, Method::Get, "list reloads after a save");
    assert!(!form.is_open());
    assert_eq!(form.draft(), None);
    assert_eq!(list.notice().success(), "Professional created successfully");
}

#[tokio::test]
async fn edit_without_new_password_leaves_it_out() {
    let backend = FakeBackend::new();
    backend.ok("");
    backend.ok("[]");
    let (form, list) = professional_form(&backend);

    form.open_edit(&existing_professional());
    assert_eq!(form.mode(), FormMode::Edit);
    assert_eq!(form.draft().unwrap().password.as_deref(), Some(""));

    let outcome = form.submit().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Saved {
            mode: FormMode::Edit,
            record: None,
        }
    );
    let request = &backend.requests()[0];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/profesionales/7");
    let body = request.body.as_ref().unwrap();
    assert!(body.get("password").is_none());
    assert_eq!(body["id"], json!(7));
    assert_eq!(list.notice().success(), "Professional updated successfully");
}

#[tokio::test]
async fn failed_save_keeps_the_draft_open() {
    let backend = FakeBackend::new();
    backend.status(409, r#"{"mensaje": "El nombre de usuario ya existe"}"#);
    let (form, _list) = professional_form(&backend);

    form.open_edit(&existing_professional());
    form.update_draft(|p| p.last_name = "Pérez Soto".to_string());

    let outcome = form.submit().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed("El nombre de usuario ya existe".to_string())
    );
    assert!(form.is_open());
    assert!(!form.is_pending());
    assert_eq!(form.draft().unwrap().last_name, "Pérez Soto");
    assert_eq!(form.notice().error(), "El nombre de usuario ya existe");
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn fallback_message_names_the_operation() {
    let backend = FakeBackend::new();
    backend.status(500, "");
    let form: EntityFormController<TherapyType> = EntityFormController::new(entity_api(&backend));
    form.open_create();
    form.update_draft(|t| {
        t.name = " kinesiologia ".to_string();
        t.unit_value = 12500.0;
    });

    form.submit().await;

    assert_eq!(form.notice().error(), "Error creating the therapy type");
    assert_eq!(
        backend.requests()[0].body.as_ref().unwrap()["nombre"],
        json!("KINESIOLOGIA")
    );
}

#[tokio::test]
async fn second_submit_while_pending_is_ignored() {
    let backend = FakeBackend::new();
    let reply = backend.hold();
    let form: Arc<EntityFormController<DocumentType>> =
        Arc::new(EntityFormController::new(entity_api(&backend)));
    form.open_create();
    form.update_draft(|d| d.name = "RUT".to_string());

    let first = tokio::spawn({
        let form = Arc::clone(&form);
        async move { form.submit().await }
    });
    backend.wait_for_requests(1).await;
    assert!(form.is_pending());

    assert_eq!(form.submit().await, SubmitOutcome::Ignored);

    reply
        .send(response(201, r#"{"id": 1, "nombre": "RUT", "activo": true}"#))
        .unwrap();
    assert!(matches!(first.await.unwrap(), SubmitOutcome::Saved { .. }));
    assert_eq!(backend.count(Method::Post), 1);
    assert_eq!(form.notice().success(), "Document type created successfully");
}

#[tokio::test]
async fn cancel_discards_draft_and_messages() {
    let backend = FakeBackend::new();
    let form: EntityFormController<DocumentType> = EntityFormController::new(entity_api(&backend));
    form.open_create();
    form.submit().await;
    assert!(form.notice().is_error());

    form.cancel();

    let state = form.snapshot();
    assert!(!state.open);
    assert_eq!(state.draft, None);
    assert!(state.touched.is_empty());
    assert_eq!(state.notice, Notice::None);
    assert_eq!(form.submit().await, SubmitOutcome::Closed);
}

#[tokio::test]
async fn late_success_leaves_a_reopened_form_alone() {
    let backend = FakeBackend::new();
    let reply = backend.hold();
    let form: Arc<EntityFormController<DocumentType>> =
        Arc::new(EntityFormController::new(entity_api(&backend)));
    form.open_create();
    form.update_draft(|d| d.name = "RUT".to_string());

    let first = tokio::spawn({
        let form = Arc::clone(&form);
        async move { form.submit().await }
    });
    backend.wait_for_requests(1).await;

    form.cancel();
    form.open_create();
    form.update_draft(|d| d.name = "PASAPORTE".to_string());
    assert!(!form.is_pending());

    reply
        .send(response(201, r#"{"id": 1, "nombre": "RUT", "activo": true}"#))
        .unwrap();
    assert!(matches!(first.await.unwrap(), SubmitOutcome::Saved { .. }));

    assert!(form.is_open());
    assert_eq!(form.draft().unwrap().name, "PASAPORTE");
    assert_eq!(form.notice(), Notice::None);
}

#[tokio::test]
async fn late_failure_does_not_mark_a_reopened_form() {
    let backend = FakeBackend::new();
    let reply = backend.hold();
    let form: Arc<EntityFormController<DocumentType>> =
        Arc::new(EntityFormController::new(entity_api(&backend)));
    form.open_create();
    form.update_draft(|d| d.name = "RUT".to_string());

    let first = tokio::spawn({
        let form = Arc::clone(&form);
        async move { form.submit().await }
    });
    backend.wait_for_requests(1).await;

    form.open_create();

    reply.send(response(500, "")).unwrap();
    assert_eq!(
        first.await.unwrap(),
        SubmitOutcome::Failed("Error creating the document type".to_string())
    );

    let state = form.snapshot();
    assert!(state.open);
    assert!(!state.pending);
    assert_eq!(state.notice, Notice::None);
    assert_eq!(state.draft.unwrap().name, "");
}
