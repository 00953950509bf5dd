//! HTTP API handlers for lyricnote-server

pub mod buildinfo;
pub mod comments;
pub mod health;
pub mod library;
pub mod lyrics;
pub mod user;
pub mod vocabulary;

pub use buildinfo::get_build_info;
pub use comments::{
    delete_comment, get_comment, get_song_comments, get_user_comments, link_comment, new_comment,
    unlink_comment, update_comment,
};
pub use health::health_routes;
pub use library::{batched_has_saved_song, get_library, has_saved_song, toggle_saved_song};
pub use lyrics::{get_track, library_tracks, search_tracks};
pub use user::get_user;
pub use vocabulary::{
    create_vocabulary_library, get_vocabulary_library, list_vocabulary_libraries, vocabulary_tool,
};
