//! Per-key request generations.
//!
//! Every new request for a key supersedes the previous one. Work belonging to a
//! superseded token (chunks, persistence, completion) must be discarded, so the
//! last request *sent* wins rather than the last one to resolve.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Identifies one request within its key's generation sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    key: String,
    generation: u64,
}

impl RequestToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Generations {
    // Global so a key that was finished and restarted never reissues an old number.
    next: u64,
    latest: HashMap<String, u64>,
}

/// Shared generation counter keyed by request scope.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    generations: Arc<Mutex<Generations>>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request for `key`, superseding any earlier one.
    pub fn begin(&self, key: impl Into<String>) -> RequestToken {
        let key = key.into();
        let mut generations = self
            .generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        generations.next += 1;
        let generation = generations.next;
        generations.latest.insert(key.clone(), generation);
        RequestToken { key, generation }
    }

    /// True while no newer request for the same key has begun.
    pub fn is_current(&self, token: &RequestToken) -> bool {
        let generations = self
            .generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        generations.latest.get(&token.key) == Some(&token.generation)
    }

    /// Forgets `token`'s key if it is still the latest request for it.
    pub fn finish(&self, token: &RequestToken) {
        let mut generations = self
            .generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if generations.latest.get(&token.key) == Some(&token.generation) {
            generations.latest.remove(&token.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_supersedes_previous() {
        let gate = RequestGate::new();
        let first = gate.begin("user:article");
        assert!(gate.is_current(&first));

        let second = gate.begin("user:article");
        assert!(!gate.is_current(&first));
        assert!(gate.is_current(&second));
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn test_keys_are_independent() {
        let gate = RequestGate::new();
        let a = gate.begin("a");
        let b = gate.begin("b");
        assert!(gate.is_current(&a));
        assert!(gate.is_current(&b));
    }

    #[test]
    fn test_finish_only_clears_latest() {
        let gate = RequestGate::new();
        let first = gate.begin("k");
        let second = gate.begin("k");

        gate.finish(&first);
        assert!(gate.is_current(&second));

        gate.finish(&second);
        assert!(!gate.is_current(&second));
        // A finished key starts over but never revives an old token.
        let third = gate.begin("k");
        assert!(gate.is_current(&third));
        assert!(!gate.is_current(&first));
    }

    #[test]
    fn test_clones_share_generations() {
        let gate = RequestGate::new();
        let clone = gate.clone();
        let token = gate.begin("k");
        clone.begin("k");
        assert!(!gate.is_current(&token));
    }
}
