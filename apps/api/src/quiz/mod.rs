//! Fill-in-the-blank quizzes over previously queried words.
//!
//! Time-driven transitions are deadline based: every mutating call takes the
//! current instant and `poll` applies whatever has come due. Front ends sleep
//! until [`FillBlankQuiz::next_deadline`] and poll again; tests pass instants
//! directly.
//!
//! # Rules
//! - Blanks are played in batches of at most [`BATCH_SIZE`].
//! - A correct answer locks its blank permanently.
//! - A wrong answer shakes the blank for [`SHAKE_DURATION`], then clears the
//!   input; the word's hint is shown for [`HINT_DURATION`].
//! - Once every blank of a batch is solved, the next batch opens after
//!   [`ADVANCE_DELAY`]. The last batch never advances.

pub mod article;
pub mod words;

use std::ops::Range;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use article::{circled_number, ArticleFillBoard};
pub use words::{queried_items, word_quiz};

pub const BATCH_SIZE: usize = 8;
pub const SHAKE_DURATION: Duration = Duration::from_millis(500);
pub const HINT_DURATION: Duration = Duration::from_millis(3000);
pub const ADVANCE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Error, PartialEq)]
pub enum QuizError {
    #[error("No blank with index {0}")]
    UnknownBlank(usize),

    #[error("Blank {0} is not part of the current batch")]
    NotInCurrentBatch(usize),
}

/// How a submitted answer is compared with the expected word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerPolicy {
    /// Answer is trimmed, then must equal the word exactly (article fill).
    ExactTrimmed,
    /// Both sides are lower-cased, the answer is trimmed (word fill).
    CaseInsensitiveTrimmed,
}

impl AnswerPolicy {
    pub fn accepts(self, answer: &str, expected: &str) -> bool {
        let answer = answer.trim();
        match self {
            AnswerPolicy::ExactTrimmed => answer == expected,
            AnswerPolicy::CaseInsensitiveTrimmed => answer.to_lowercase() == expected.to_lowercase(),
        }
    }
}

/// A word to guess and the text shown after a wrong answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
    pub word: String,
    pub hint: Option<String>,
}

impl QuizItem {
    pub fn new(word: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            word: word.into(),
            hint,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Blank {
    item: QuizItem,
    input: String,
    solved: bool,
    shake_until: Option<Instant>,
}

impl Blank {
    fn new(item: QuizItem) -> Self {
        Self {
            item,
            input: String::new(),
            solved: false,
            shake_until: None,
        }
    }

    pub fn word(&self) -> &str {
        &self.item.word
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_until.is_some()
    }
}

/// Hint shown after a wrong answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveHint {
    pub word: String,
    pub text: String,
    until: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Correct { batch_complete: bool },
    Incorrect,
    /// The blank was already locked; nothing changed.
    AlreadySolved,
}

/// Progress counters for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub batch: usize,
    pub batch_count: usize,
    pub solved_in_batch: usize,
    pub batch_len: usize,
    pub solved_total: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct FillBlankQuiz {
    policy: AnswerPolicy,
    blanks: Vec<Blank>,
    batch: usize,
    hint: Option<ActiveHint>,
    advance_at: Option<Instant>,
}

impl FillBlankQuiz {
    pub fn new(policy: AnswerPolicy, items: Vec<QuizItem>) -> Self {
        Self {
            policy,
            blanks: items.into_iter().map(Blank::new).collect(),
            batch: 0,
            hint: None,
            advance_at: None,
        }
    }

    pub fn policy(&self) -> AnswerPolicy {
        self.policy
    }

    pub fn blanks(&self) -> &[Blank] {
        &self.blanks
    }

    pub fn blank(&self, index: usize) -> Option<&Blank> {
        self.blanks.get(index)
    }

    pub fn batch_count(&self) -> usize {
        self.blanks.len().div_ceil(BATCH_SIZE)
    }

    /// Indices of the blanks in the current batch.
    pub fn batch_range(&self) -> Range<usize> {
        let start = (self.batch * BATCH_SIZE).min(self.blanks.len());
        let end = (start + BATCH_SIZE).min(self.blanks.len());
        start..end
    }

    pub fn current_batch(&self) -> &[Blank] {
        &self.blanks[self.batch_range()]
    }

    /// Replaces the pending input of an unsolved blank.
    pub fn input(&mut self, index: usize, value: &str) -> Result<(), QuizError> {
        let blank = self.blank_in_batch(index)?;
        if !blank.solved {
            blank.input = value.to_string();
        }
        Ok(())
    }

    /// Checks the pending input of `index`.
    pub fn submit(&mut self, index: usize, now: Instant) -> Result<SubmitOutcome, QuizError> {
        self.poll(now);
        let policy = self.policy;
        let blank = self.blank_in_batch(index)?;

        if blank.solved {
            return Ok(SubmitOutcome::AlreadySolved);
        }
        // An empty answer is a wrong answer like any other.
        if policy.accepts(&blank.input, &blank.item.word) {
            blank.solved = true;
            blank.shake_until = None;
            blank.input = blank.item.word.clone();

            let batch_complete = self.current_batch().iter().all(Blank::is_solved);
            if batch_complete && self.batch + 1 < self.batch_count() {
                self.advance_at = Some(now + ADVANCE_DELAY);
            }
            return Ok(SubmitOutcome::Correct { batch_complete });
        }

        blank.shake_until = Some(now + SHAKE_DURATION);
        let word = blank.item.word.clone();
        let hint = blank.item.hint.clone().unwrap_or_default();
        self.hint = Some(ActiveHint {
            word,
            text: hint,
            until: now + HINT_DURATION,
        });
        Ok(SubmitOutcome::Incorrect)
    }

    /// Applies every transition due at `now`.
    pub fn poll(&mut self, now: Instant) {
        for blank in &mut self.blanks {
            if blank.shake_until.is_some_and(|until| until <= now) {
                blank.shake_until = None;
                blank.input.clear();
            }
        }
        if self.hint.as_ref().is_some_and(|h| h.until <= now) {
            self.hint = None;
        }
        if self.advance_at.is_some_and(|at| at <= now) {
            self.advance_at = None;
            self.batch += 1;
        }
    }

    /// Earliest pending transition, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.blanks
            .iter()
            .filter_map(|b| b.shake_until)
            .chain(self.hint.as_ref().map(|h| h.until))
            .chain(self.advance_at)
            .min()
    }

    pub fn active_hint(&self) -> Option<&ActiveHint> {
        self.hint.as_ref()
    }

    pub fn progress(&self) -> Progress {
        let batch = self.current_batch();
        Progress {
            batch: self.batch,
            batch_count: self.batch_count(),
            solved_in_batch: batch.iter().filter(|b| b.solved).count(),
            batch_len: batch.len(),
            solved_total: self.blanks.iter().filter(|b| b.solved).count(),
            total: self.blanks.len(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.blanks.iter().all(Blank::is_solved)
    }

    fn blank_in_batch(&mut self, index: usize) -> Result<&mut Blank, QuizError> {
        if index >= self.blanks.len() {
            return Err(QuizError::UnknownBlank(index));
        }
        if !self.batch_range().contains(&index) {
            return Err(QuizError::NotInCurrentBatch(index));
        }
        Ok(&mut self.blanks[index])
    }
}
