//! Bearer token supply
//!
//! The client never owns session state. It asks an injected [`TokenSupplier`]
//! for a token on every request and proceeds unauthenticated when none is
//! available.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::{error::Error as StdError, fmt, sync::Arc};

/// Error produced by a token supplier
pub type TokenError = Box<dyn StdError + Send + Sync>;

/// Asynchronous source of session tokens
#[async_trait]
pub trait TokenSupplier: Send + Sync {
    /// Current bearer token, or `None` when there is no session
    ///
    /// # Errors
    ///
    /// Returns an error if the identity provider could not be reached.
    async fn token(&self) -> Result<Option<String>, TokenError>;
}

/// Supplier for a fixed, pre-issued token
#[derive(Clone)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// Supplier that always yields `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Supplier that never yields a token
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken")
            .field(&self.0.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl TokenSupplier for StaticToken {
    async fn token(&self) -> Result<Option<String>, TokenError> {
        Ok(self.0.clone())
    }
}

/// Two-phase token holder shared by every client built from one session
///
/// Starts uninitialized and yields no token. Once a session exists the
/// delegate supplier is installed with [`TokenSlot::set`], which may be called
/// again at any time to replace it.
#[derive(Clone, Default)]
pub struct TokenSlot {
    inner: Arc<RwLock<Option<Arc<dyn TokenSupplier>>>>,
}

impl TokenSlot {
    /// Uninitialized slot
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Install or replace the delegate supplier
    pub fn set(&self, supplier: Arc<dyn TokenSupplier>) {
        *self.inner.write() = Some(supplier);
    }

    /// Drop the delegate, e.g. after sign-out
    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    /// Whether a supplier has been installed
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl fmt::Debug for TokenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSlot")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[async_trait]
impl TokenSupplier for TokenSlot {
    async fn token(&self) -> Result<Option<String>, TokenError> {
        // Clone the delegate out so the lock is not held across the await.
        let supplier = self.inner.read().clone();
        match supplier {
            Some(supplier) => supplier.token().await,
            None => Ok(None),
        }
    }
}
