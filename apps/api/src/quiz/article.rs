//! Article fill: the article text with every queried word turned into a blank.
//!
//! Matching here is case-sensitive and answers must reproduce the word exactly
//! (after trimming), unlike the word quiz.

use std::collections::HashMap;

use crate::highlight::{partition, CaseMode, Fragment, HighlightError, KeyMatcher};
use crate::quiz::{AnswerPolicy, FillBlankQuiz, QuizItem};

#[derive(Debug, Clone)]
pub struct ArticleFillBoard {
    pieces: Vec<Fragment<usize>>,
    quiz: FillBlankQuiz,
}

impl ArticleFillBoard {
    /// Turns each whole-word occurrence of a queried word into a numbered blank.
    pub fn build(article: &str, words: &[QuizItem]) -> Result<Self, HighlightError> {
        let matcher = KeyMatcher::new(words.iter().map(|w| &w.word), CaseMode::Sensitive)?;
        let hints: HashMap<&str, &Option<String>> =
            words.iter().map(|w| (w.word.as_str(), &w.hint)).collect();

        let mut blanks = Vec::new();
        let pieces = partition(article, &matcher, |site| {
            let hint = hints.get(site.matched).and_then(|h| (*h).clone());
            blanks.push(QuizItem::new(site.matched, hint));
            site.ordinal
        });

        Ok(Self {
            pieces,
            quiz: FillBlankQuiz::new(AnswerPolicy::ExactTrimmed, blanks),
        })
    }

    pub fn pieces(&self) -> &[Fragment<usize>] {
        &self.pieces
    }

    pub fn quiz(&self) -> &FillBlankQuiz {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> &mut FillBlankQuiz {
        &mut self.quiz
    }

    /// Article text with solved blanks filled in and open ones shown as ①, ②, …
    pub fn render(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Match(index) => match self.quiz.blank(*index) {
                    Some(blank) if blank.is_solved() => out.push_str(blank.word()),
                    _ => out.push_str(&circled_number(*index)),
                },
            }
        }
        out
    }
}

/// ① for 0 up to ⑳ for 19, then a parenthesised number.
pub fn circled_number(index: usize) -> String {
    if index < 20 {
        // U+2460 CIRCLED DIGIT ONE
        char::from_u32(0x2460 + index as u32)
            .map(String::from)
            .unwrap_or_else(|| format!("({})", index + 1))
    } else {
        format!("({})", index + 1)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::quiz::SubmitOutcome;

    fn words() -> Vec<QuizItem> {
        vec![
            QuizItem::new("Paris", Some("capitale de la France".to_string())),
            QuizItem::new("ville", None),
        ]
    }

    #[test]
    fn test_blanks_follow_article_order_and_case() {
        let board =
            ArticleFillBoard::build("Paris est une ville. paris, la Ville, Paris!", &words())
                .unwrap();
        let blank_words: Vec<&str> = board.quiz().blanks().iter().map(|b| b.word()).collect();
        assert_eq!(blank_words, vec!["Paris", "ville", "Paris"]);
        assert_eq!(
            board.render(),
            "① est une ②. paris, la Ville, ③!"
        );
    }

    #[test]
    fn test_solving_fills_the_article() {
        let mut board = ArticleFillBoard::build("Paris est une ville.", &words()).unwrap();
        let now = Instant::now();

        board.quiz_mut().input(0, "paris").unwrap();
        assert_eq!(
            board.quiz_mut().submit(0, now).unwrap(),
            SubmitOutcome::Incorrect
        );
        assert_eq!(
            board.quiz().active_hint().map(|h| h.text.as_str()),
            Some("capitale de la France")
        );

        board.quiz_mut().input(0, " Paris ").unwrap();
        assert!(matches!(
            board.quiz_mut().submit(0, now).unwrap(),
            SubmitOutcome::Correct { .. }
        ));
        assert_eq!(board.render(), "Paris est une ②.");
    }

    #[test]
    fn test_pieces_reconstruct_article() {
        let article = "La ville de Paris.";
        let board = ArticleFillBoard::build(article, &words()).unwrap();
        let rebuilt: String = board
            .pieces()
            .iter()
            .map(|p| match p {
                Fragment::Text(t) => t.clone(),
                Fragment::Match(i) => board.quiz().blank(*i).unwrap().word().to_string(),
            })
            .collect();
        assert_eq!(rebuilt, article);
    }

    #[test]
    fn test_circled_numbers() {
        assert_eq!(circled_number(0), "①");
        assert_eq!(circled_number(19), "⑳");
        assert_eq!(circled_number(20), "(21)");
    }
}
