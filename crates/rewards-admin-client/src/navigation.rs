//! Navigation side effects triggered by authentication failures

use parking_lot::Mutex;
use std::sync::Arc;

/// Sign-in screen path
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Access denied screen path
pub const ACCESS_DENIED_PATH: &str = "/access-denied";

/// Global location the client may redirect on auth failures
pub trait Navigator: Send + Sync {
    /// Path currently displayed
    fn current_path(&self) -> String;

    /// Replace the current location
    fn navigate(&self, path: &str);
}

/// Navigate to `target` unless the navigator is already there
///
/// Returns whether a navigation happened.
pub fn redirect_once(navigator: &dyn Navigator, target: &str) -> bool {
    if navigator.current_path().starts_with(target) {
        return false;
    }
    navigator.navigate(target);
    true
}

/// In-memory navigator that records every redirect
#[derive(Debug, Clone)]
pub struct RecordingNavigator {
    state: Arc<Mutex<NavigatorState>>,
}

#[derive(Debug)]
struct NavigatorState {
    current: String,
    history: Vec<String>,
}

impl RecordingNavigator {
    /// Navigator positioned at `path`
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(NavigatorState {
                current: path.into(),
                history: Vec::new(),
            })),
        }
    }

    /// Redirects performed so far, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.lock().history.clone()
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::at("/dashboard")
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.state.lock().current.clone()
    }

    fn navigate(&self, path: &str) {
        let mut state = self.state.lock();
        state.current = path.to_string();
        state.history.push(path.to_string());
        drop(state);
        tracing::info!(path, "Redirecting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_redirect_once_is_idempotent() {
        let navigator = RecordingNavigator::at("/businesses");

        assert!(redirect_once(&navigator, SIGN_IN_PATH));
        assert!(!redirect_once(&navigator, SIGN_IN_PATH));

        assert_eq!(navigator.history(), vec![SIGN_IN_PATH.to_string()]);
        assert_eq!(navigator.current_path(), SIGN_IN_PATH);
    }

    #[test]
    fn test_redirect_skipped_on_nested_sign_in_path() {
        let navigator = RecordingNavigator::at("/sign-in/factor-one");

        assert!(!redirect_once(&navigator, SIGN_IN_PATH));
        assert!(navigator.history().is_empty());
    }
}
