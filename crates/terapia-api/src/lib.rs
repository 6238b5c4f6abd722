//! terapia-api
//!
//! REST access to the clinic backend. Thin, typed wrapper around a
//! [`transport::Transport`]; the default transport is `reqwest`.

pub mod client;
pub mod error;
pub mod http;
pub mod resources;
pub mod transport;

pub use crate::client::{ApiClient, TokenProvider};
pub use crate::error::ApiError;
pub use crate::resources::{AuthApi, EntityApi};
pub use crate::transport::{ApiRequest, Method, RawResponse, Transport, TransportError};
