//! Fuzzy search over library tracks and comments
//!
//! Each searchable item exposes weighted text fields. A field's similarity
//! to the query is 1.0 when it contains the query, otherwise the best
//! Jaro-Winkler score over the whole field and over every run of words as
//! long as the query. An item matches when any field reaches
//! [`MIN_SIMILARITY`]; matches are ordered by their weighted mean similarity.

use lyricnote_common::db::MergedComment;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::services::Track;

/// Lowest field similarity that counts as a match
pub const MIN_SIMILARITY: f64 = 0.8;

/// Text fields of an item with their ranking weights
pub trait Searchable {
    fn search_fields(&self) -> Vec<(&str, f64)>;
}

impl Searchable for Track {
    fn search_fields(&self) -> Vec<(&str, f64)> {
        vec![
            (self.track_name.as_str(), 0.4),
            (self.artist_name.as_str(), 0.3),
            (self.album_name.as_str(), 0.2),
        ]
    }
}

/// A comment together with the track of its home song, if known
struct CommentEntry<'a> {
    comment: MergedComment,
    track: Option<&'a Track>,
}

impl Searchable for CommentEntry<'_> {
    fn search_fields(&self) -> Vec<(&str, f64)> {
        let mut fields = vec![
            (self.comment.comment.title.as_str(), 0.5),
            (self.comment.comment.content.as_str(), 0.5),
        ];
        if let Some(track) = self.track {
            fields.extend([
                (track.track_name.as_str(), 0.3),
                (track.artist_name.as_str(), 0.2),
                (track.album_name.as_str(), 0.15),
            ]);
        }
        fields
    }
}

/// Similarity of `text` to `query` in `0.0..=1.0`, case-insensitive
pub fn similarity(query: &str, text: &str) -> f64 {
    let query = query.trim().to_lowercase();
    let text = text.trim().to_lowercase();
    if query.is_empty() || text.is_empty() {
        return 0.0;
    }
    if text.contains(&query) {
        return 1.0;
    }

    let span = query.split_whitespace().count();
    let words: Vec<&str> = text.split_whitespace().collect();

    let mut best = strsim::jaro_winkler(&query, &text);
    if words.len() > span {
        for window in words.windows(span) {
            best = best.max(strsim::jaro_winkler(&query, &window.join(" ")));
        }
    }
    best
}

/// Weighted mean similarity, or `None` when no field matches
fn score<T: Searchable>(item: &T, query: &str) -> Option<f64> {
    let mut matched = false;
    let mut weighted = 0.0;
    let mut total = 0.0;

    for (text, weight) in item.search_fields() {
        let sim = similarity(query, text);
        matched |= sim >= MIN_SIMILARITY;
        weighted += sim * weight;
        total += weight;
    }

    (matched && total > 0.0).then(|| weighted / total)
}

/// Keep the items matching `query`, best first
///
/// A blank query returns `items` unchanged. Equal scores keep input order.
pub fn rank<T: Searchable>(items: Vec<T>, query: &str) -> Vec<T> {
    if query.trim().is_empty() {
        return items;
    }

    let mut scored: Vec<(f64, T)> = items
        .into_iter()
        .filter_map(|item| score(&item, query).map(|s| (s, item)))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, item)| item).collect()
}

/// Rank comments by their text and the metadata of their home song
///
/// `tracks` is keyed by song id; comments whose home song is absent are
/// searched on title and content alone.
pub fn rank_comments(
    comments: Vec<MergedComment>,
    tracks: &HashMap<i64, Track>,
    query: &str,
) -> Vec<MergedComment> {
    let entries: Vec<CommentEntry> = comments
        .into_iter()
        .map(|comment| {
            let track = tracks.get(&comment.comment.song);
            CommentEntry { comment, track }
        })
        .collect();

    rank(entries, query)
        .into_iter()
        .map(|entry| entry.comment)
        .collect()
}
