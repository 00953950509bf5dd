//! Vocabulary libraries proposed through the `createLibrary` tool call

use lyricnote_common::db::{begin_write, Sentence, VocabularyLibrary, VocabularyLibrarySummary};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

use crate::db::vocabulary;
use crate::error::{ApiError, ApiResult};

pub const TOOL_NAME: &str = "createLibrary";

const SENTENCE_ENDINGS: [char; 6] = ['。', '！', '？', '.', '!', '?'];

/// Arguments of a `createLibrary` tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLibraryPayload {
    pub name: String,
    pub sentences: Vec<Sentence>,
}

/// Tool declaration handed to the chat model
pub fn tool_definition() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Ask the user to create a library.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of library. Can include spaces etc."
                },
                "sentences": {
                    "type": "array",
                    "description": "The sentences to insert into the library",
                    "items": {
                        "type": "object",
                        "properties": {
                            "definition": {
                                "type": "string",
                                "description": "Definition of the sentence in English"
                            },
                            "words": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "character": {
                                            "type": "string",
                                            "description": "Chinese character"
                                        },
                                        "pinyin": {
                                            "type": "string",
                                            "description": "Pinyin for the character"
                                        }
                                    },
                                    "required": ["character", "pinyin"]
                                }
                            }
                        },
                        "required": ["definition", "words"]
                    }
                }
            },
            "required": ["name", "sentences"]
        }
    })
}

fn is_punctuation(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| !c.is_alphanumeric())
}

fn invalid(message: String) -> ApiError {
    lyricnote_common::Error::InvalidInput(message).into()
}

/// Check a payload against the tool's content rules
pub fn validate(payload: &CreateLibraryPayload) -> ApiResult<()> {
    if payload.name.trim().is_empty() {
        return Err(invalid("Library name is empty".to_string()));
    }

    if payload.sentences.is_empty() {
        return Err(invalid("Library has no sentences".to_string()));
    }

    let mut definitions = HashSet::new();
    for (index, sentence) in payload.sentences.iter().enumerate() {
        let definition = sentence.definition.trim();
        if definition.is_empty() {
            return Err(invalid(format!("Sentence {} has an empty definition", index)));
        }
        if !definitions.insert(definition) {
            return Err(invalid(format!("Duplicate definition: {}", definition)));
        }

        if sentence.words.is_empty() {
            return Err(invalid(format!("Sentence {} has no words", index)));
        }

        let mut endings = 0;
        for word in &sentence.words {
            if word.character.trim().is_empty() {
                return Err(invalid(format!("Sentence {} has a word with no character", index)));
            }
            if word.pinyin.trim().is_empty() && !is_punctuation(&word.character) {
                return Err(invalid(format!(
                    "Word '{}' in sentence {} is missing pinyin",
                    word.character, index
                )));
            }
            endings += word.character.chars().filter(|c| SENTENCE_ENDINGS.contains(c)).count();
        }

        if endings > 1 {
            return Err(invalid(format!("Sentence {} has more than one sentence ending", index)));
        }
    }

    Ok(())
}

/// Validate and store a library for `user`, returning its id
pub async fn create_library(pool: &SqlitePool, user: Uuid, payload: CreateLibraryPayload) -> ApiResult<Uuid> {
    validate(&payload)?;

    let library = VocabularyLibrary {
        id: Uuid::new_v4(),
        user,
        name: payload.name.trim().to_string(),
        created_at: chrono::Utc::now().timestamp_millis(),
        sentences: payload.sentences,
    };

    let mut tx = begin_write(pool).await?;
    vocabulary::insert_library(&mut tx, &library).await?;
    tx.commit().await?;

    info!(library = %library.id, sentences = library.sentences.len(), "Created vocabulary library");
    Ok(library.id)
}

pub async fn list_libraries(pool: &SqlitePool, user: Uuid) -> ApiResult<Vec<VocabularyLibrarySummary>> {
    let mut conn = pool.acquire().await?;
    Ok(vocabulary::libraries_for_user(&mut conn, user).await?)
}

/// A library with its sentences (owner only)
pub async fn get_library(pool: &SqlitePool, user: Uuid, id: Uuid) -> ApiResult<VocabularyLibrary> {
    let mut conn = pool.acquire().await?;
    let library = vocabulary::find_library(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vocabulary library".to_string()))?;

    if library.user != user {
        return Err(ApiError::PermissionDenied);
    }

    Ok(library)
}
