//! Where session tokens live between requests.
//!
//! A carrier is a single-slot store keyed by the token name: reading goes
//! through [`TokenSource`], writing and clearing through [`SessionCarrier`].
//! Two variants ship with the crate:
//!
//! - `http::HeaderMap`, for server responses and requests (`Set-Cookie` out,
//!   `Cookie` in).
//! - [`ClientStorage`], script-style key/value storage for code running on
//!   the client side of the exchange.

use super::cookie::{extract_cookie, sets_cookie, SessionCookie};
use crate::error::Result;
use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

/// Read access to an inbound session token.
pub trait TokenSource: Sync {
    fn session_token(&self, name: &str) -> Option<String>;
}

/// Write access to the session slot.
pub trait SessionCarrier: Send {
    /// Store or clear the session; a new token replaces any previous one.
    ///
    /// # Errors
    /// Returns an error if the cookie cannot be encoded for this carrier.
    fn write_session(&mut self, cookie: &SessionCookie<'_>) -> Result<()>;
}

impl TokenSource for HeaderMap {
    fn session_token(&self, name: &str) -> Option<String> {
        self.get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| extract_cookie(value, name).filter(|token| !token.is_empty()))
    }
}

impl SessionCarrier for HeaderMap {
    fn write_session(&mut self, cookie: &SessionCookie<'_>) -> Result<()> {
        let value = HeaderValue::from_str(&cookie.header_value())?;

        // Keep every other cookie; drop earlier writes to this slot.
        let kept: Vec<HeaderValue> = self
            .get_all(SET_COOKIE)
            .iter()
            .filter(|existing| {
                existing
                    .to_str()
                    .map_or(true, |existing| !sets_cookie(existing, cookie.name))
            })
            .cloned()
            .collect();

        self.remove(SET_COOKIE);
        for existing in kept {
            self.append(SET_COOKIE, existing);
        }
        self.append(SET_COOKIE, value);

        Ok(())
    }
}

#[derive(Clone, Debug)]
struct StoredToken {
    value: String,
    expires_at: Option<Instant>,
}

/// In-process token storage for clients without a cookie jar.
///
/// Values are readable by the code holding the storage, so unlike the
/// response variant there is no `HttpOnly` protection.
#[derive(Clone, Debug, Default)]
pub struct ClientStorage {
    entries: HashMap<String, StoredToken>,
}

impl ClientStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seed the storage with a token, e.g. one persisted by a previous run.
    pub fn insert(&mut self, name: &str, token: &str) {
        self.entries.insert(
            name.to_string(),
            StoredToken {
                value: token.to_string(),
                expires_at: None,
            },
        );
    }
}

impl TokenSource for ClientStorage {
    fn session_token(&self, name: &str) -> Option<String> {
        let stored = self.entries.get(name)?;
        if stored
            .expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
        {
            return None;
        }
        Some(stored.value.clone())
    }
}

impl SessionCarrier for ClientStorage {
    fn write_session(&mut self, cookie: &SessionCookie<'_>) -> Result<()> {
        if cookie.is_clear() {
            self.entries.remove(cookie.name);
            return Ok(());
        }

        let expires_at = cookie
            .max_age
            .and_then(|age| u64::try_from(age).ok())
            .and_then(|age| Instant::now().checked_add(Duration::from_secs(age)));

        self.entries.insert(
            cookie.name.to_string(),
            StoredToken {
                value: cookie.token.to_string(),
                expires_at,
            },
        );

        Ok(())
    }
}
