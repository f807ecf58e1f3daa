//! Project and chapter records

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A novel project owned by a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Full chapter record
///
/// Within one project the `order` values are exactly `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub content: String,
    pub order: u32,
    pub word_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// Chapter listing row (no content)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub word_count: u32,
    pub updated_at: String,
}

/// Chapter content as handed to the AI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContent {
    pub id: String,
    pub title: String,
    pub content: String,
    pub word_count: u32,
    pub order: u32,
    pub project_id: String,
}

impl From<Chapter> for ChapterContent {
    fn from(chapter: Chapter) -> Self {
        Self {
            id: chapter.id,
            title: chapter.title,
            content: chapter.content,
            word_count: chapter.word_count,
            order: chapter.order,
            project_id: chapter.project_id,
        }
    }
}

/// Position of one chapter, as read by the order maintainer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderEntry {
    pub id: String,
    pub order: u32,
}

/// Input for creating a chapter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewChapter {
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Insert position; appended after the last chapter when absent
    #[serde(default)]
    pub order: Option<u32>,
}

/// Partial chapter update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChapterUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ChapterUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

static MARKDOWN_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[#*_`~\[\]()]").expect("markdown syntax pattern is valid")
});

/// Count words in chapter text, ignoring markdown punctuation.
pub fn count_words(text: &str) -> u32 {
    if text.trim().is_empty() {
        return 0;
    }

    let cleaned = MARKDOWN_SYNTAX.replace_all(text, "");
    cleaned.split_whitespace().count() as u32
}
