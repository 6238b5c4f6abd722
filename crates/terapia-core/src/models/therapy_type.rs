use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::{Entity, EntityKind, FormMode, default_active, is_blank};

/// A billable kind of therapy and its unit price in Chilean pesos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TherapyType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "valorUnitario", default)]
    pub unit_value: f64,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

impl TherapyType {
    pub fn formatted_unit_value(&self) -> String {
        format_clp(self.unit_value)
    }
}

impl Entity for TherapyType {
    const KIND: EntityKind = EntityKind::TherapyType;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            unit_value: 0.0,
            active: true,
        }
    }

    fn missing_fields(&self, _mode: FormMode) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.name) {
            missing.push("nombre");
        }
        if !self.unit_value.is_finite() || self.unit_value < 0.0 {
            missing.push("valorUnitario");
        }
        missing
    }

    fn form_fields() -> &'static [&'static str] {
        &["nombre", "valorUnitario", "activo"]
    }

    /// Names are stored upper-case.
    fn normalized(&self, _mode: FormMode) -> Self {
        Self {
            name: self.name.trim().to_uppercase(),
            ..self.clone()
        }
    }
}

/// Format an amount as Chilean pesos: no decimals, `.` as thousands separator.
///
/// `12500.0` becomes `"$12.500"`, `-990.4` becomes `"-$990"`.
pub fn format_clp(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
