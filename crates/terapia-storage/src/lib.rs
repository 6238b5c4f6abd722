//! terapia-storage
//!
//! Client-side persisted state: small named string slots that survive
//! restarts (the console's equivalent of browser local storage).

pub mod error;
pub mod kv;
pub mod state;
