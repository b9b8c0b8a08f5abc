//! Transient operator notifications

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::{error, info};

/// How long a success toast stays visible
pub const SUCCESS_TTL: Duration = Duration::from_secs(3);

/// How long an error toast stays visible
pub const ERROR_TTL: Duration = Duration::from_secs(4);

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

impl ToastLevel {
    const fn ttl(self) -> Duration {
        match self {
            Self::Success => SUCCESS_TTL,
            Self::Error => ERROR_TTL,
        }
    }
}

/// A dismissible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Identifier used to dismiss the toast
    pub id: u64,
    /// Severity
    pub level: ToastLevel,
    /// Text shown to the operator
    pub message: String,
    /// When the toast disappears on its own
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
struct NotifierState {
    next_id: u64,
    toasts: Vec<Toast>,
}

/// Shared toast queue; clones observe the same queue
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    state: Arc<Mutex<NotifierState>>,
}

impl Notifier {
    /// Empty notifier
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a success toast
    pub fn success(&self, message: impl Into<String>) -> u64 {
        let message = message.into();
        info!(message = %message, "Operation succeeded");
        self.push(ToastLevel::Success, message)
    }

    /// Push an error toast; error toasts are also logged
    pub fn error(&self, message: impl Into<String>) -> u64 {
        let message = message.into();
        error!(message = %message, "Operation failed");
        self.push(ToastLevel::Error, message)
    }

    fn push(&self, level: ToastLevel, message: String) -> u64 {
        let now = Instant::now();
        let mut state = self.state.lock();
        state.toasts.retain(|toast| toast.expires_at > now);
        state.next_id += 1;
        let id = state.next_id;
        state.toasts.push(Toast {
            id,
            level,
            message,
            expires_at: now + level.ttl(),
        });
        id
    }

    /// Dismiss a toast before it expires; returns whether it was visible
    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = self.state.lock();
        let before = state.toasts.len();
        state.toasts.retain(|toast| toast.id != id);
        state.toasts.len() != before
    }

    /// Toasts still visible at `now`, oldest first; expired ones are pruned
    pub fn visible(&self, now: Instant) -> Vec<Toast> {
        let mut state = self.state.lock();
        state.toasts.retain(|toast| toast.expires_at > now);
        state.toasts.clone()
    }

    /// Most recent toast, expired or not
    #[must_use]
    pub fn last(&self) -> Option<Toast> {
        self.state.lock().toasts.last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn test_toasts_expire_by_level() {
        let notifier = Notifier::new();
        notifier.success("Business verified successfully");
        notifier.error("Failed to verify business");

        tokio::time::advance(Duration::from_millis(3500)).await;
        let visible = notifier.visible(Instant::now());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].level, ToastLevel::Error);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(notifier.visible(Instant::now()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_drops_expired_toasts() {
        let notifier = Notifier::new();
        for _ in 0..50 {
            notifier.error("Failed to load businesses");
            tokio::time::advance(Duration::from_secs(5)).await;
        }
        notifier.success("Business verified successfully");

        assert_eq!(notifier.state.lock().toasts.len(), 1);
        assert_eq!(
            notifier.last().map(|t| t.level),
            Some(ToastLevel::Success)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_removes_toast() {
        let notifier = Notifier::new();
        let id = notifier.error("Network error");

        assert!(notifier.dismiss(id));
        assert!(!notifier.dismiss(id));
        assert!(notifier.visible(Instant::now()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_queue() {
        let notifier = Notifier::new();
        let handle = notifier.clone();

        handle.success("Category created");

        assert_eq!(
            notifier.last().map(|t| t.message),
            Some("Category created".to_string())
        );
    }
}
