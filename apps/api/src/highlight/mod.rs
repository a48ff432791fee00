//! Highlight / match engine.
//!
//! Finds whole-word occurrences of known keys in free text and partitions the
//! text into alternating plain and matched fragments. What a match becomes is
//! decided by the caller's strategy: a highlight with a record count here, an
//! answer blank in `quiz`.
//!
//! Keys are tried longest first, so `running` wins over `run` at the same
//! position. Concatenating the fragments always reproduces the input text.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("Failed to build match pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Whether keys match regardless of letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    Sensitive,
    Insensitive,
}

impl CaseMode {
    /// The lookup form of a key or a matched substring.
    pub fn canonical(self, s: &str) -> String {
        match self {
            CaseMode::Sensitive => s.to_string(),
            CaseMode::Insensitive => s.to_lowercase(),
        }
    }
}

/// Compiled word-boundary matcher over a set of keys.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    regex: Option<Regex>,
    case: CaseMode,
    keys: Vec<String>,
}

impl KeyMatcher {
    /// Deduplicates `keys` (by canonical form), drops empty ones and orders the
    /// rest by descending length before building the alternation.
    pub fn new<I, S>(keys: I, case: CaseMode) -> Result<Self, HighlightError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys: Vec<String> = keys
            .into_iter()
            .map(|k| case.canonical(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        keys.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        keys.dedup();

        if keys.is_empty() {
            return Ok(Self {
                regex: None,
                case,
                keys,
            });
        }

        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let regex = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
            .case_insensitive(case == CaseMode::Insensitive)
            .build()?;

        Ok(Self {
            regex: Some(regex),
            case,
            keys,
        })
    }

    /// Canonical keys in match priority order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// One match found by [`partition`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSite<'t> {
    /// The matched substring with its original casing.
    pub matched: &'t str,
    /// Canonical lookup key for the match.
    pub key: String,
    pub start: usize,
    pub end: usize,
    /// Zero-based position of this match among all matches.
    pub ordinal: usize,
}

/// A piece of the partitioned text.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment<T> {
    Text(String),
    Match(T),
}

/// Splits `text` into plain fragments and `on_match` results, in order.
pub fn partition<T, F>(text: &str, matcher: &KeyMatcher, mut on_match: F) -> Vec<Fragment<T>>
where
    F: FnMut(MatchSite<'_>) -> T,
{
    let mut fragments = Vec::new();
    if text.is_empty() {
        return fragments;
    }
    let Some(regex) = &matcher.regex else {
        fragments.push(Fragment::Text(text.to_string()));
        return fragments;
    };

    let mut last_end = 0;
    for (ordinal, m) in regex.find_iter(text).enumerate() {
        if m.start() > last_end {
            fragments.push(Fragment::Text(text[last_end..m.start()].to_string()));
        }
        fragments.push(Fragment::Match(on_match(MatchSite {
            matched: m.as_str(),
            key: matcher.case.canonical(m.as_str()),
            start: m.start(),
            end: m.end(),
            ordinal,
        })));
        last_end = m.end();
    }
    if last_end < text.len() {
        fragments.push(Fragment::Text(text[last_end..].to_string()));
    }
    fragments
}

// ────────────────────────────────────────────────────────────────────────────
// Highlight strategy
// ────────────────────────────────────────────────────────────────────────────

/// Rendered segment of a highlighted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text {
        content: String,
    },
    Highlight {
        content: String,
        key: String,
        /// Number of stored records for `key`.
        count: usize,
    },
}

impl Segment {
    pub fn content(&self) -> &str {
        match self {
            Segment::Text { content } | Segment::Highlight { content, .. } => content,
        }
    }

    pub fn is_highlight(&self) -> bool {
        matches!(self, Segment::Highlight { .. })
    }
}

/// Case-insensitive index of previously queried words and their record counts.
#[derive(Debug, Clone)]
pub struct HighlightIndex {
    counts: HashMap<String, usize>,
    matcher: KeyMatcher,
}

impl HighlightIndex {
    /// Builds the index from `word → count` pairs. Words differing only in
    /// case are merged.
    pub fn from_counts<I, S>(counts: I) -> Result<Self, HighlightError>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: AsRef<str>,
    {
        let mut merged: HashMap<String, usize> = HashMap::new();
        for (word, count) in counts {
            let key = CaseMode::Insensitive.canonical(word.as_ref());
            if key.is_empty() {
                continue;
            }
            *merged.entry(key).or_default() += count;
        }
        let matcher = KeyMatcher::new(merged.keys(), CaseMode::Insensitive)?;
        Ok(Self {
            counts: merged,
            matcher,
        })
    }

    /// Builds the index counting one record per occurrence in `words`.
    pub fn from_words<I, S>(words: I) -> Result<Self, HighlightError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_counts(words.into_iter().map(|w| (w, 1)))
    }

    pub fn count(&self, word: &str) -> usize {
        self.counts
            .get(&CaseMode::Insensitive.canonical(word))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Partitions `text` into plain and highlighted segments.
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        partition(text, &self.matcher, |site| Segment::Highlight {
            content: site.matched.to_string(),
            count: self.counts.get(&site.key).copied().unwrap_or(0),
            key: site.key,
        })
        .into_iter()
        .map(|fragment| match fragment {
            Fragment::Text(content) => Segment::Text { content },
            Fragment::Match(segment) => segment,
        })
        .collect()
    }
}
