use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User id stored when the client does not send one.
pub const ANONYMOUS_USER: &str = "anonymous";

/// One past AI interaction: selected text, requested analysis, AI answer.
/// Records are never updated in place; a re-query replaces the record with the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QueryRecord {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: String,
    pub selected_text: String,
    pub prompt_type: String,
    pub prompt_label: String,
    pub ai_response: String,
    pub article_language: String,
    pub mother_tongue: String,
    pub created_at: DateTime<Utc>,
}

impl QueryRecord {
    pub fn key(&self) -> QueryKey<'_> {
        QueryKey {
            article_id: self.article_id,
            user_id: &self.user_id,
            selected_text: &self.selected_text,
            prompt_type: &self.prompt_type,
        }
    }

    pub fn matches_languages(&self, article_language: &str, mother_tongue: &str) -> bool {
        self.article_language == article_language && self.mother_tongue == mother_tongue
    }
}

/// Identity of a query for replacement purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey<'a> {
    pub article_id: Uuid,
    pub user_id: &'a str,
    pub selected_text: &'a str,
    pub prompt_type: &'a str,
}

/// Payload for creating a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQueryRecord {
    pub article_id: Uuid,
    #[serde(default)]
    pub user_id: String,
    pub selected_text: String,
    pub prompt_type: String,
    pub prompt_label: String,
    pub ai_response: String,
    pub article_language: String,
    pub mother_tongue: String,
}

impl NewQueryRecord {
    /// Returns the names of required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("selected_text", &self.selected_text),
            ("prompt_type", &self.prompt_type),
            ("prompt_label", &self.prompt_label),
            ("ai_response", &self.ai_response),
            ("article_language", &self.article_language),
            ("mother_tongue", &self.mother_tongue),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Materialises the record with a fresh id and timestamp.
    pub fn into_record(self) -> QueryRecord {
        QueryRecord {
            id: Uuid::new_v4(),
            article_id: self.article_id,
            user_id: normalize_user_id(&self.user_id),
            selected_text: self.selected_text,
            prompt_type: self.prompt_type,
            prompt_label: self.prompt_label,
            ai_response: self.ai_response,
            article_language: self.article_language,
            mother_tongue: self.mother_tongue,
            created_at: Utc::now(),
        }
    }
}

pub fn normalize_user_id(user_id: &str) -> String {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        ANONYMOUS_USER.to_string()
    } else {
        trimmed.to_string()
    }
}
