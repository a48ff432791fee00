//! Typing replay. Reveals an already-received text one character per tick.
//!
//! Presentation only: it knows nothing about where the text came from. At most
//! one timer is active per `TypingReplay`; starting a new replay cancels the
//! previous one and dropping the value cancels it too.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Delay between two revealed characters.
pub const TYPING_TICK: Duration = Duration::from_millis(30);

/// Shared between the owner and its timer task. The task holds the lock for
/// the whole generation check, sink call and `typing` update, so a replay
/// that lost the lock to a restart can neither emit nor clear `typing`.
#[derive(Debug, Default)]
struct ReplayState {
    generation: u64,
    typing: bool,
}

#[derive(Debug, Default)]
pub struct TypingReplay {
    task: Option<JoinHandle<()>>,
    state: Arc<Mutex<ReplayState>>,
}

fn lock(state: &Mutex<ReplayState>) -> MutexGuard<'_, ReplayState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TypingReplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts revealing `full_text`, calling `sink` with the revealed prefix on
    /// every tick. Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, full_text: impl Into<String>, mut sink: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.cancel();

        let text = full_text.into();
        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.typing = true;
            state.generation
        };
        let shared = Arc::clone(&self.state);

        self.task = Some(tokio::spawn(async move {
            // Byte offsets just past each character, so prefixes never split one.
            let ends: Vec<usize> = text
                .char_indices()
                .map(|(start, c)| start + c.len_utf8())
                .collect();

            let mut ticker = interval_at(Instant::now() + TYPING_TICK, TYPING_TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut revealed = 0;
            loop {
                ticker.tick().await;
                let mut state = lock(&shared);
                if state.generation != generation {
                    return;
                }
                if revealed < ends.len() {
                    sink(&text[..ends[revealed]]);
                    revealed += 1;
                }
                if revealed == ends.len() {
                    state.typing = false;
                    return;
                }
            }
        }));
    }

    /// Stops the active replay, if any. The revealed prefix stays where it is.
    /// Waits for an update already in progress to finish.
    pub fn cancel(&mut self) {
        {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.typing = false;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// True while a replay is still revealing characters.
    pub fn is_typing(&self) -> bool {
        lock(&self.state).typing
    }

    /// Waits until the active replay finishes or is cancelled.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TypingReplay {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use tokio::time::sleep;

    use super::*;

    fn recording_sink(
        frames: &Arc<Mutex<Vec<String>>>,
        tag: &'static str,
    ) -> impl FnMut(&str) + Send + 'static {
        let frames = Arc::clone(frames);
        move |revealed: &str| {
            frames
                .lock()
                .unwrap()
                .push(format!("{tag}{revealed}"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveals_one_character_per_tick_then_stops() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let mut replay = TypingReplay::new();
        replay.start("abc", recording_sink(&frames, ""));
        assert!(replay.is_typing());

        sleep(TYPING_TICK / 2).await;
        assert!(frames.lock().unwrap().is_empty());

        sleep(TYPING_TICK).await;
        assert_eq!(*frames.lock().unwrap(), vec!["a"]);

        sleep(TYPING_TICK * 20).await;
        assert_eq!(*frames.lock().unwrap(), vec!["a", "ab", "abc"]);
        assert!(!replay.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_cancels_first() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let mut replay = TypingReplay::new();
        replay.start("aaaa", recording_sink(&frames, "1:"));

        sleep(TYPING_TICK + TYPING_TICK / 2).await;
        replay.start("bb", recording_sink(&frames, "2:"));

        sleep(TYPING_TICK * 20).await;
        assert_eq!(*frames.lock().unwrap(), vec!["1:a", "2:b", "2:bb"]);
        assert!(!replay.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let mut replay = TypingReplay::new();
        replay.start("hello", recording_sink(&frames, ""));
        drop(replay);

        sleep(TYPING_TICK * 20).await;
        assert!(frames.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_revealed_prefix() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let mut replay = TypingReplay::new();
        replay.start("hello", recording_sink(&frames, ""));

        sleep(TYPING_TICK * 2 + TYPING_TICK / 2).await;
        replay.cancel();
        assert!(!replay.is_typing());

        sleep(TYPING_TICK * 20).await;
        assert_eq!(*frames.lock().unwrap(), vec!["h", "he"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_finishes_without_updates() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let mut replay = TypingReplay::new();
        replay.start("", recording_sink(&frames, ""));

        sleep(TYPING_TICK * 2).await;
        assert!(frames.lock().unwrap().is_empty());
        assert!(!replay.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_multibyte_characters_are_revealed_whole() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let mut replay = TypingReplay::new();
        replay.start("été", recording_sink(&frames, ""));
        replay.join().await;
        assert_eq!(*frames.lock().unwrap(), vec!["é", "ét", "été"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_restart_during_update_keeps_new_replay_typing() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = mpsc::channel();
        let mut replay = TypingReplay::new();

        // A one-character replay finishes in the very update the restart races with.
        let old_frames = Arc::clone(&frames);
        replay.start("a", move |revealed: &str| {
            let _ = entered_tx.send(());
            std::thread::sleep(Duration::from_millis(50));
            old_frames.lock().unwrap().push(format!("1:{revealed}"));
        });
        tokio::task::spawn_blocking(move || entered_rx.recv())
            .await
            .unwrap()
            .unwrap();

        replay.start("bcdefghij", recording_sink(&frames, "2:"));
        assert!(replay.is_typing());

        sleep(TYPING_TICK * 3).await;
        assert!(replay.is_typing());
        let seen = frames.lock().unwrap().clone();
        assert_eq!(seen[0], "1:a");
        assert!(seen[1..].iter().all(|frame| frame.starts_with("2:")));

        replay.join().await;
        assert!(!replay.is_typing());
        assert_eq!(frames.lock().unwrap().last().unwrap(), "2:bcdefghij");
    }
}
