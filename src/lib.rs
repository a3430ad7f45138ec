//! # cognito-session
//!
//! Cookie-based session management backed by a Cognito user pool.
//!
//! ## Session lifecycle
//!
//! [`SessionManager`] turns username/password credentials into a session
//! token and turns an inbound token back into a verified identity. It holds no
//! session state of its own: tokens live in a carrier (an HTTP `HeaderMap` on
//! the server, [`session::ClientStorage`] on the client) and every lookup is
//! re-verified with the provider.
//!
//! ## Configuration
//!
//! Region, client id and an access key pair are required. A manager is only
//! ever built from a complete [`ProviderConfig`]; a missing value fails
//! construction with [`Error::Configuration`] naming it.
//!
//! ## Errors
//!
//! Input problems surface as [`Error::Validation`] before any provider call.
//! Provider failures (bad credentials, unconfirmed users, throttling) are
//! passed through unchanged as [`Error::Authentication`]. Nothing is retried.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod session;

pub use config::ProviderConfig;
pub use error::{Error, ProviderError, Result};
pub use session::{Identity, Principal, SessionManager};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
