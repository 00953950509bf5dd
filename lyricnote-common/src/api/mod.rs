//! Credential helpers shared by HTTP-facing crates

pub mod auth;

pub use auth::{generate_session_token, hash_session_token, lookup_session_user, store_session};
