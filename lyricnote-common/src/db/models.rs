//! Database models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public profile of a signed-in user
///
/// Both fields are `None` for anonymous callers and for users the identity
/// provider recorded without a name or avatar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: Option<String>,
    pub image_url: Option<String>,
}

/// An annotation anchored to a character range of one song's lyrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    /// Home song the comment was written on
    pub song: i64,
    pub start: i64,
    pub end: i64,
    pub color: String,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds
    pub creation_time: i64,
}

/// A comment re-anchored on a second song with its own offsets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedComment {
    pub id: Uuid,
    pub comment: Uuid,
    pub song: i64,
    pub start: i64,
    pub end: i64,
    pub user: Uuid,
}

/// One entry of the merged comment view
///
/// `linked` is `None` for a comment written on this song and
/// `Some(home song)` for a link resolved against its comment, in which case
/// `start`/`end` are the link's offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub linked: Option<i64>,
}

impl MergedComment {
    pub fn owned(comment: Comment) -> Self {
        Self {
            comment,
            linked: None,
        }
    }

    pub fn via_link(comment: Comment) -> Self {
        let home = comment.song;
        Self {
            comment,
            linked: Some(home),
        }
    }

    pub fn is_linked(&self) -> bool {
        self.linked.is_some()
    }
}

/// A single word of a vocabulary sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub character: String,
    /// Empty for punctuation
    #[serde(default)]
    pub pinyin: String,
}

/// An example sentence with its English definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub definition: String,
    pub words: Vec<Word>,
}

/// A named set of example sentences owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyLibrary {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub created_at: i64,
    pub sentences: Vec<Sentence>,
}

/// Listing entry for a vocabulary library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyLibrarySummary {
    pub id: Uuid,
    pub name: String,
    pub sentence_count: i64,
    pub created_at: i64,
}
