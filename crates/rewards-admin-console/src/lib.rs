//! Super-admin console for the rewards platform
//!
//! This crate holds the console's page-level state: filter sets and their
//! query parameters, search debouncing, the query cache with
//! invalidate-on-mutation, moderation dialogs, route guarding and toasts.
//! The `rewards-admin` binary drives it from the command line.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod coordinator;
pub mod dashboard;
pub mod debounce;
pub mod dialogs;
pub mod error;
pub mod filters;
pub mod notify;
pub mod session;

// Re-export commonly used types
pub use coordinator::{
    Collection, Coordinator, ListView, Mutation, QueryCache, QueryKey, RetryPolicy, load_into,
};
pub use debounce::SearchDebouncer;
pub use dialogs::{
    AccountKind, CategoryFormDialog, ConfirmDeleteDialog, Dialog, DialogState, SuspendDialog, VerifyDialog,
};
pub use error::{ConsoleError, Result};
pub use filters::{
    BusinessFilters, CategoryFilters, ContentFilters, CreatorFilters, CreatorSort, FilterSet,
};
pub use notify::{Notifier, Toast, ToastLevel};
pub use session::{Guard, Route, RouteGuard, Session, guard};

use rewards_admin_client::{AdminService, ApiClient, StaticToken};
use rewards_admin_core::Config;
use std::sync::Arc;

/// Console wiring built from configuration
#[derive(Debug, Clone)]
pub struct Console {
    coordinator: Coordinator,
    route_guard: RouteGuard,
    search: SearchDebouncer,
}

impl Console {
    /// Shared reads and writes
    #[must_use]
    pub const fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Guard enforcing the configured operator role
    #[must_use]
    pub const fn route_guard(&self) -> &RouteGuard {
        &self.route_guard
    }

    /// Fresh search debouncer with the configured quiet period
    #[must_use]
    pub fn search_debouncer(&self) -> SearchDebouncer {
        self.search.clone()
    }
}

/// Build the console for `config`, authenticating with the configured token
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn connect(config: &Config, notifier: Notifier) -> Result<Console> {
    let mut client = ApiClient::from_config(config)?;
    if let Some(token) = &config.auth.token {
        client = client.with_token_supplier(Arc::new(StaticToken::new(token.clone())));
    }
    Ok(Console {
        coordinator: Coordinator::new(AdminService::new(client), notifier),
        route_guard: RouteGuard::from_config(&config.auth),
        search: SearchDebouncer::from_config(&config.console),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn test_connect_applies_console_settings() {
        let mut config = Config::new("https://api.example.com", "pk_test");
        config.auth.required_role = "ops_admin".to_string();
        config.console.search_debounce_ms = 300;

        let console = connect(&config, Notifier::new()).unwrap();

        assert_eq!(console.route_guard().required_role(), "ops_admin");
        assert_eq!(
            console.search_debouncer().delay(),
            Duration::from_millis(300)
        );
        assert!(console.coordinator().cache().is_empty());
    }
}
