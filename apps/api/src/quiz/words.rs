//! Word fill: the queried words themselves, answered without regard to case.

use std::collections::HashSet;

use crate::models::QueryRecord;
use crate::quiz::{AnswerPolicy, FillBlankQuiz, QuizItem};

/// Distinct selected texts for one language pair, newest first like the records.
/// The hint of a word is the AI response of its newest record.
pub fn queried_items(
    records: &[QueryRecord],
    article_language: &str,
    mother_tongue: &str,
) -> Vec<QuizItem> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| r.matches_languages(article_language, mother_tongue))
        .filter(|r| !r.selected_text.is_empty())
        .filter(|r| seen.insert(r.selected_text.as_str()))
        .map(|r| QuizItem::new(r.selected_text.clone(), Some(r.ai_response.clone())))
        .collect()
}

pub fn word_quiz(records: &[QueryRecord], article_language: &str, mother_tongue: &str) -> FillBlankQuiz {
    FillBlankQuiz::new(
        AnswerPolicy::CaseInsensitiveTrimmed,
        queried_items(records, article_language, mother_tongue),
    )
}
