use jiff::Timestamp;
use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::{Entity, EntityKind, FormMode, default_active, is_blank};
use crate::error::CoreError;

/// A single therapy session of a patient with a professional.
///
/// `fecha` is kept as the backend's string (a local date-time such as
/// `2025-03-14T10:30:00`) and parsed on demand for ordering and grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TherapySession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "pacienteId", default)]
    pub patient_id: i64,
    #[serde(rename = "profesionalId", default)]
    pub professional_id: i64,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "servicioDepartamentoId", default)]
    pub service_department_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servicio_departamento_nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servicio_departamento_abreviacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paciente_nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paciente_apellido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profesional_nombre: Option<String>,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

impl TherapySession {
    /// The session's local date-time, if `fecha` parses.
    pub fn datetime(&self) -> Result<DateTime, CoreError> {
        parse_session_datetime(&self.date)
    }

    pub fn patient_full_name(&self) -> Option<String> {
        match (&self.paciente_nombre, &self.paciente_apellido) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }
}

/// Parse a backend session timestamp.
///
/// Accepts an instant with offset (converted to UTC wall time), a local
/// date-time, or a bare date (midnight).
pub fn parse_session_datetime(value: &str) -> Result<DateTime, CoreError> {
    let value = value.trim();
    if let Ok(ts) = value.parse::<Timestamp>() {
        return Ok(ts.to_zoned(TimeZone::UTC).datetime());
    }
    if let Ok(dt) = value.parse::<DateTime>() {
        return Ok(dt);
    }
    value
        .parse::<Date>()
        .map(|d| d.to_datetime(Time::midnight()))
        .map_err(|e| CoreError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Group sessions by calendar day, most recent day first. Within a day the
/// input order is kept. Sessions whose date does not parse are left out.
pub fn group_by_day(sessions: &[TherapySession]) -> Vec<(Date, Vec<TherapySession>)> {
    let mut days: Vec<(Date, Vec<TherapySession>)> = Vec::new();
    for session in sessions {
        let Ok(dt) = session.datetime() else {
            continue;
        };
        let day = dt.date();
        match days.iter_mut().find(|(d, _)| *d == day) {
            Some((_, group)) => group.push(session.clone()),
            None => days.push((day, vec![session.clone()])),
        }
    }
    days.sort_by(|a, b| b.0.cmp(&a.0));
    days
}

impl Entity for TherapySession {
    const KIND: EntityKind = EntityKind::TherapySession;

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
            patient_id: 0,
            professional_id: 0,
            date: String::new(),
            service_department_id: 0,
            servicio_departamento_nombre: None,
            servicio_departamento_abreviacion: None,
            paciente_nombre: None,
            paciente_apellido: None,
            profesional_nombre: None,
            active: true,
        }
    }

    fn missing_fields(&self, _mode: FormMode) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.patient_id <= 0 {
            missing.push("pacienteId");
        }
        if self.professional_id <= 0 {
            missing.push("profesionalId");
        }
        if is_blank(&self.date) {
            missing.push("fecha");
        }
        if self.service_department_id <= 0 {
            missing.push("servicioDepartamentoId");
        }
        missing
    }

    fn form_fields() -> &'static [&'static str] {
        &[
            "pacienteId",
            "profesionalId",
            "fecha",
            "servicioDepartamentoId",
        ]
    }

    /// Most recent first; sessions with an unparseable date go last.
    fn sort_for_display(items: &mut [Self]) {
        items.sort_by(|a, b| b.datetime().ok().cmp(&a.datetime().ok()));
    }
}
