//! `field=value` assignments applied to a form draft from the command line.

use serde_json::Value;

use terapia_core::entity::Entity;

/// Parse one `field=value` argument.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got {raw:?}")),
    }
}

/// Copy of `draft` with the given wire fields overwritten.
///
/// Values are taken as text for string fields and as JSON for the rest
/// (`tipoDocumentoId=3`, `valorUnitario=12500`, `activo=false`).
pub fn apply_fields<E: Entity>(draft: &E, fields: &[(String, String)]) -> eyre::Result<E> {
    let mut value = serde_json::to_value(draft)?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("{} is not a JSON object", E::KIND.label()))?;

    for (field, raw) in fields {
        if !E::form_fields().iter().any(|known| *known == field.as_str()) {
            eyre::bail!(
                "unknown field {field:?} for {}; expected one of: {}",
                E::KIND.label(),
                E::form_fields().join(", ")
            );
        }
        let parsed = match object.get(field.as_str()) {
            Some(Value::String(_)) | Some(Value::Null) | None => Value::String(raw.clone()),
            Some(_) => serde_json::from_str(raw)
                .map_err(|e| eyre::eyre!("invalid value for {field}: {e}"))?,
        };
        object.insert(field.clone(), parsed);
    }

    Ok(serde_json::from_value(value)?)
}
