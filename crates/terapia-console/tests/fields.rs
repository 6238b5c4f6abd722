use terapia_console::fields::{apply_fields, parse_assignment};
use terapia_core::entity::Entity;
use terapia_core::models::patient::Patient;
use terapia_core::models::therapy_type::TherapyType;

fn assignments(raw: &[&str]) -> Vec<(String, String)> {
    raw.iter().map(|a| parse_assignment(a).unwrap()).collect()
}

#[test]
fn assignments_split_on_the_first_equals() {
    assert_eq!(
        parse_assignment("descripcion=a=b").unwrap(),
        ("descripcion".to_string(), "a=b".to_string())
    );
    assert!(parse_assignment("nombre").is_err());
    assert!(parse_assignment("=x").is_err());
}

#[test]
fn numbers_and_flags_are_read_as_json() {
    let draft = apply_fields(
        &Patient::blank(),
        &assignments(&["nombre=Camila", "numeroDocumento=007", "tipoDocumentoId=3"]),
    )
    .unwrap();
    assert_eq!(draft.first_name, "Camila");
    assert_eq!(draft.document_number, "007");
    assert_eq!(draft.document_type_id, 3);

    let draft = apply_fields(
        &TherapyType::blank(),
        &assignments(&["nombre=Fonoaudiología", "valorUnitario=12500", "activo=false"]),
    )
    .unwrap();
    assert_eq!(draft.unit_value, 12500.0);
    assert!(!draft.active);
}

#[test]
fn unknown_or_malformed_fields_are_refused() {
    let err = apply_fields(&TherapyType::blank(), &assignments(&["precio=10"])).unwrap_err();
    assert!(err.to_string().contains("unknown field"));

    let err =
        apply_fields(&TherapyType::blank(), &assignments(&["valorUnitario=mucho"])).unwrap_err();
    assert!(err.to_string().contains("invalid value for valorUnitario"));
}
