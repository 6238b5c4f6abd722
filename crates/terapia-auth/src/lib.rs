//! terapia-auth
//!
//! Console session state: login/logout against the backend, the persisted
//! token and profile, and the route-entry guards derived from them.
//!
//! The token is never decoded or verified here. Role checks trust the
//! profile stored at login; the backend must authorize every request.

pub mod error;
pub mod gate;
pub mod guard;
pub mod session;

pub use crate::error::AuthError;
pub use crate::gate::SessionGate;
pub use crate::guard::{Guard, GuardDecision, Redirect};
pub use crate::session::Session;
