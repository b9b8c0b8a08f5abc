//! Client SDK for the rewards platform admin API
//!
//! [`ApiClient`] injects bearer tokens, normalizes failures into [`ApiError`]
//! and performs the sign-in / access-denied redirects. [`AdminService`] layers
//! the typed `/admin` endpoints on top.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod auth;
pub mod error;
pub mod navigation;
pub mod service;

pub use api_client::{ApiClient, QueryParams};
pub use auth::{StaticToken, TokenSlot, TokenSupplier};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use navigation::{Navigator, RecordingNavigator};
pub use service::{AdminService, BusinessPage, ContentPage, CreatorPage, MutationAck};
