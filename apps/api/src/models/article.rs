use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The article being read. Its language pair scopes which records count as
/// queried words for quizzes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    pub content: String,
    pub article_language: String,
    pub mother_tongue: String,
}
