//! Route table and role-filtered navigation.

use terapia_auth::guard::{STAFF_LANDING, landing_path};
use terapia_auth::{Guard, GuardDecision, Redirect, Session};
use terapia_core::entity::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Professionals,
    DocumentTypes,
    TherapyTypes,
    ServiceDepartments,
    Patients,
    TherapySessions,
}

impl Screen {
    /// The entity a screen manages, if it is a CRUD screen.
    pub fn entity_kind(self) -> Option<EntityKind> {
        match self {
            Screen::Login => None,
            Screen::Professionals => Some(EntityKind::Professional),
            Screen::DocumentTypes => Some(EntityKind::DocumentType),
            Screen::TherapyTypes => Some(EntityKind::TherapyType),
            Screen::ServiceDepartments => Some(EntityKind::ServiceDepartment),
            Screen::Patients => Some(EntityKind::Patient),
            Screen::TherapySessions => Some(EntityKind::TherapySession),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub title: &'static str,
    pub screen: Screen,
    pub guard: Guard,
}

pub const ROUTES: &[Route] = &[
    Route {
        path: "/login",
        title: "Sign in",
        screen: Screen::Login,
        guard: Guard::Public,
    },
    Route {
        path: "/profesionales",
        title: "Professionals",
        screen: Screen::Professionals,
        guard: Guard::Admin,
    },
    Route {
        path: "/pacientes",
        title: "Patients",
        screen: Screen::Patients,
        guard: Guard::Authenticated,
    },
    Route {
        path: "/terapias",
        title: "Therapy sessions",
        screen: Screen::TherapySessions,
        guard: Guard::Authenticated,
    },
    Route {
        path: "/admin/pacientes/tipos-documento",
        title: "Document types",
        screen: Screen::DocumentTypes,
        guard: Guard::Admin,
    },
    Route {
        path: "/admin/tipos-terapia",
        title: "Therapy types",
        screen: Screen::TherapyTypes,
        guard: Guard::Admin,
    },
    Route {
        path: "/admin/servicios-departamentos",
        title: "Services/departments",
        screen: Screen::ServiceDepartments,
        guard: Guard::Admin,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Mount(Screen),
    /// Go here instead; includes any `returnUrl` query.
    Redirect(String),
    NotFound,
}

/// Resolve `path` for `session`.
pub fn navigate(session: &Session, path: &str) -> Navigation {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');

    if path.is_empty() {
        return Navigation::Redirect(Redirect::login().href());
    }

    let Some(route) = ROUTES.iter().find(|r| r.path == path) else {
        tracing::debug!(path, "no route");
        return Navigation::NotFound;
    };

    if route.screen == Screen::Login && session.is_authenticated() {
        let landing = session
            .profile
            .as_ref()
            .map(landing_path)
            .unwrap_or(STAFF_LANDING);
        return Navigation::Redirect(landing.to_string());
    }

    match route.guard.check(session, path) {
        GuardDecision::Allow => Navigation::Mount(route.screen),
        GuardDecision::Redirect(redirect) => Navigation::Redirect(redirect.href()),
    }
}

/// Sidebar entries the session may open.
pub fn sidebar(session: &Session) -> Vec<&'static Route> {
    ROUTES
        .iter()
        .filter(|r| r.screen != Screen::Login)
        .filter(|r| match r.guard {
            Guard::Public => true,
            Guard::Authenticated => session.is_authenticated(),
            Guard::Admin => session.is_admin(),
        })
        .collect()
}
