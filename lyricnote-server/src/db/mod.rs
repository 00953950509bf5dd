//! Database access layer for lyricnote-server
//!
//! Functions take `&mut SqliteConnection` so services can run several of
//! them inside one transaction (`&mut tx`) or on a pooled connection.

pub mod comments;
pub mod library;
pub mod links;
pub mod vocabulary;
