//! Reader session: the client-side state of one reader, owned by one task.
//!
//! Holds the open article, its query records (newest first) and the current
//! selection. The highlighted-word map is derived from the records and kept
//! in sync on every change.

use std::collections::HashMap;

use uuid::Uuid;

use crate::highlight::{HighlightError, HighlightIndex};
use crate::models::{Article, QueryRecord, QueryType};
use crate::quiz::{queried_items, word_quiz, ArticleFillBoard, FillBlankQuiz, QuizItem};
use crate::stream::{RequestGate, RequestToken};

const QUERY_KEY: &str = "session";

#[derive(Debug, Default)]
pub struct ReaderSession {
    article: Option<Article>,
    records: Vec<QueryRecord>,
    highlighted: HashMap<String, Vec<Uuid>>,
    selected_text: String,
    selected_prompt: Option<QueryType>,
    gate: RequestGate,
}

impl ReaderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `article`. Records and selection belong to the previous article
    /// and are cleared; pending queries are superseded.
    pub fn set_article(&mut self, article: Article) {
        self.article = Some(article);
        self.records.clear();
        self.highlighted.clear();
        self.selected_text.clear();
        self.selected_prompt = None;
        self.gate.begin(QUERY_KEY);
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    /// Replaces all records. `records` must already be newest first.
    pub fn set_records(&mut self, records: Vec<QueryRecord>) {
        self.records = records;
        self.rebuild_highlights();
    }

    /// Puts `record` at the front, dropping any record it replaces (same id or same key).
    pub fn add_record(&mut self, record: QueryRecord) {
        self.records
            .retain(|r| r.id != record.id && r.key() != record.key());
        self.records.insert(0, record);
        self.rebuild_highlights();
    }

    /// Returns false when no record has `id`.
    pub fn remove_record(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.rebuild_highlights();
        }
        removed
    }

    pub fn records(&self) -> &[QueryRecord] {
        &self.records
    }

    /// Record ids per lower-cased selected text.
    pub fn highlighted_words(&self) -> &HashMap<String, Vec<Uuid>> {
        &self.highlighted
    }

    pub fn highlight_index(&self) -> Result<HighlightIndex, HighlightError> {
        HighlightIndex::from_counts(self.highlighted.iter().map(|(word, ids)| (word, ids.len())))
    }

    /// Distinct queried words for the open article's language pair.
    pub fn queried_words(&self) -> Vec<QuizItem> {
        match &self.article {
            Some(article) => queried_items(
                &self.records,
                &article.article_language,
                &article.mother_tongue,
            ),
            None => Vec::new(),
        }
    }

    /// AI response of the newest record for `word` in the open language pair.
    pub fn hint_for(&self, word: &str) -> Option<&str> {
        let article = self.article.as_ref()?;
        self.records
            .iter()
            .find(|r| {
                r.selected_text == word
                    && r.matches_languages(&article.article_language, &article.mother_tongue)
            })
            .map(|r| r.ai_response.as_str())
    }

    pub fn word_quiz(&self) -> Option<FillBlankQuiz> {
        let article = self.article.as_ref()?;
        Some(word_quiz(
            &self.records,
            &article.article_language,
            &article.mother_tongue,
        ))
    }

    pub fn article_fill(&self) -> Result<Option<ArticleFillBoard>, HighlightError> {
        let Some(article) = &self.article else {
            return Ok(None);
        };
        ArticleFillBoard::build(&article.content, &self.queried_words()).map(Some)
    }

    pub fn select_text(&mut self, text: impl Into<String>) {
        self.selected_text = text.into();
    }

    pub fn selected_text(&self) -> &str {
        &self.selected_text
    }

    pub fn select_prompt(&mut self, prompt: Option<QueryType>) {
        self.selected_prompt = prompt;
    }

    pub fn selected_prompt(&self) -> Option<QueryType> {
        self.selected_prompt
    }

    /// Starts a query, superseding any query still in flight.
    pub fn begin_query(&self) -> RequestToken {
        self.gate.begin(QUERY_KEY)
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.gate.is_current(token)
    }

    fn rebuild_highlights(&mut self) {
        self.highlighted.clear();
        for record in &self.records {
            if record.selected_text.is_empty() {
                continue;
            }
            self.highlighted
                .entry(record.selected_text.to_lowercase())
                .or_default()
                .push(record.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewQueryRecord;

    fn article() -> Article {
        Article {
            id: Uuid::new_v4(),
            title: "Paris".to_string(),
            content: "Le chat dort. Un Chat noir.".to_string(),
            article_language: "fr".to_string(),
            mother_tongue: "en".to_string(),
        }
    }

    fn record(article: &Article, text: &str, prompt_type: &str, response: &str) -> QueryRecord {
        NewQueryRecord {
            article_id: article.id,
            user_id: "alice".to_string(),
            selected_text: text.to_string(),
            prompt_type: prompt_type.to_string(),
            prompt_label: prompt_type.to_string(),
            ai_response: response.to_string(),
            article_language: article.article_language.clone(),
            mother_tongue: article.mother_tongue.clone(),
        }
        .into_record()
    }

    #[test]
    fn test_add_record_replaces_by_key() {
        let article = article();
        let mut session = ReaderSession::new();
        session.set_article(article.clone());

        session.add_record(record(&article, "chat", "quick", "cat"));
        session.add_record(record(&article, "dort", "quick", "sleeps"));
        session.add_record(record(&article, "chat", "quick", "a cat"));

        let texts: Vec<&str> = session.records().iter().map(|r| r.selected_text.as_str()).collect();
        assert_eq!(texts, vec!["chat", "dort"]);
        assert_eq!(session.records()[0].ai_response, "a cat");
        assert_eq!(session.highlighted_words()["chat"].len(), 1);
    }

    #[test]
    fn test_highlighted_words_are_lower_cased() {
        let article = article();
        let mut session = ReaderSession::new();
        session.set_article(article.clone());
        session.set_records(vec![
            record(&article, "Chat", "deep", "cat (deep)"),
            record(&article, "chat", "quick", "cat"),
        ]);

        assert_eq!(session.highlighted_words()["chat"].len(), 2);
        let index = session.highlight_index().unwrap();
        assert_eq!(index.count("CHAT"), 2);
        let highlighted = index
            .segments(&article.content)
            .iter()
            .filter(|s| s.is_highlight())
            .count();
        assert_eq!(highlighted, 2);
    }

    #[test]
    fn test_remove_record_updates_highlights() {
        let article = article();
        let mut session = ReaderSession::new();
        session.set_article(article.clone());
        let rec = record(&article, "chat", "quick", "cat");
        let id = rec.id;
        session.add_record(rec);

        assert!(session.remove_record(id));
        assert!(!session.remove_record(id));
        assert!(session.highlighted_words().is_empty());
    }

    #[test]
    fn test_queried_words_and_hints() {
        let article = article();
        let mut session = ReaderSession::new();
        session.set_article(article.clone());
        let mut foreign = record(&article, "Hund", "quick", "dog");
        foreign.article_language = "de".to_string();
        session.set_records(vec![
            record(&article, "chat", "deep", "cat (newest)"),
            foreign,
            record(&article, "chat", "quick", "cat"),
        ]);

        let words: Vec<String> = session.queried_words().into_iter().map(|i| i.word).collect();
        assert_eq!(words, vec!["chat"]);
        assert_eq!(session.hint_for("chat"), Some("cat (newest)"));
        assert_eq!(session.hint_for("Hund"), None);
    }

    #[test]
    fn test_article_fill_uses_queried_words() {
        let article = article();
        let mut session = ReaderSession::new();
        assert!(session.article_fill().unwrap().is_none());

        session.set_article(article.clone());
        session.add_record(record(&article, "chat", "quick", "cat"));
        let board = session.article_fill().unwrap().unwrap();
        // Case-sensitive: only the lower-case occurrence becomes a blank.
        assert_eq!(board.quiz().blanks().len(), 1);
        assert_eq!(session.word_quiz().unwrap().blanks().len(), 1);
    }

    #[test]
    fn test_newer_query_supersedes_older() {
        let mut session = ReaderSession::new();
        let first = session.begin_query();
        let second = session.begin_query();
        assert!(!session.is_current(&first));
        assert!(session.is_current(&second));

        session.set_article(article());
        assert!(!session.is_current(&second));
    }

    #[test]
    fn test_set_article_clears_selection() {
        let mut session = ReaderSession::new();
        session.select_text("chat");
        session.select_prompt(Some(QueryType::Deep));
        assert_eq!(session.selected_text(), "chat");
        assert_eq!(session.selected_prompt(), Some(QueryType::Deep));

        session.set_article(article());
        assert!(session.selected_text().is_empty());
        assert_eq!(session.selected_prompt(), None);
        assert!(session.records().is_empty());
    }
}
