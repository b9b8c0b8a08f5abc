//! Search input debouncing
//!
//! Keystrokes are held until the input has been quiet for the configured
//! delay; only then is the value committed to the filter state. Clearing the
//! field commits immediately.

use rewards_admin_core::config::ConsoleConfig;
use tokio::{
    sync::mpsc,
    time::{Duration, Instant, sleep_until},
};
use tracing::debug;

/// Quiet period before a search value is committed
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(500);

/// Clock-driven debounce state machine
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    committed: String,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DELAY)
    }
}

impl SearchDebouncer {
    /// Debouncer with the given quiet period
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            committed: String::new(),
        }
    }

    /// Debouncer using the configured quiet period
    #[must_use]
    pub const fn from_config(console: &ConsoleConfig) -> Self {
        Self::new(Duration::from_millis(console.search_debounce_ms))
    }

    /// Quiet period before a value commits
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a keystroke
    ///
    /// Returns the committed value when the input commits immediately, which
    /// only happens when the field is cleared.
    pub fn input(&mut self, value: impl Into<String>, now: Instant) -> Option<String> {
        let value = value.into();
        if value.is_empty() {
            self.pending = None;
            return self.commit(value);
        }
        self.pending = Some((value, now + self.delay));
        None
    }

    /// Commit the pending value if its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.pending.take() {
            Some((value, due)) if due <= now => self.commit(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// When the pending value becomes due
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Last committed value
    #[must_use]
    pub fn committed(&self) -> &str {
        &self.committed
    }

    fn commit(&mut self, value: String) -> Option<String> {
        if value == self.committed {
            return None;
        }
        self.committed.clone_from(&value);
        Some(value)
    }

    /// Drive the debouncer from a channel of raw input values
    ///
    /// Committed values are sent on `commits`. Returns when either channel
    /// closes; a value still pending at that point is dropped.
    pub async fn run(mut self, mut input: mpsc::Receiver<String>, commits: mpsc::Sender<String>) {
        loop {
            let deadline = self.deadline();
            let committed = tokio::select! {
                received = input.recv() => match received {
                    Some(value) => self.input(value, Instant::now()),
                    None => break,
                },
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.poll(Instant::now())
                }
            };

            if let Some(value) = committed {
                debug!(search = %value, "Search committed");
                if commits.send(value).await.is_err() {
                    break;
                }
            }
        }
        debug!("Search debouncer stopped");
    }
}
