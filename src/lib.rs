//! Minimal multi-tenant to-do list API
//!
//! Users register, optionally upgrade to a pro plan, and manage per-user
//! to-do items over HTTP. All state is in memory for the process lifetime;
//! every mutating route runs an ordered guard pipeline before touching the
//! store.

pub mod config;
pub mod error;
pub mod guards;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use state::AppState;
