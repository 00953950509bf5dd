//! Business logic between the HTTP handlers and the database layer

pub mod comments;
pub mod library;
pub mod lyrics_client;
pub mod search;
pub mod vocabulary;

pub use lyrics_client::{LyricsClient, LyricsError, SearchScope, Track};
