//! # LyricNote Common Library
//!
//! Shared code for the LyricNote service including:
//! - Database initialization and record models
//! - Session credential hashing
//! - Configuration loading and root folder resolution
//! - Common error types

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
