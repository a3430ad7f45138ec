//! Session lifecycle on top of an identity provider.
//!
//! Flow Overview:
//! - `sign_up` registers an unconfirmed user, `confirm_sign_up` confirms it and
//!   `resend_confirmation_code` delivers a fresh code meanwhile.
//! - `initiate_auth` trades credentials for an access token and writes it to
//!   the caller's carrier as the session token.
//! - `get_server_side_user` (lenient) and `authenticate` (strict) resolve the
//!   token back into an identity with one provider round trip each.
//! - `sign_out` revokes the token provider-side, then clears the carrier.
//!
//! The manager keeps no per-session state; every call re-verifies with the
//! provider, and provider success or failure is the only source of truth.

pub mod carrier;
pub mod cookie;
pub mod identity;

#[cfg(test)]
mod tests;

pub use carrier::{ClientStorage, SessionCarrier, TokenSource};
pub use cookie::SessionCookie;
pub use identity::{Identity, Principal, SUBJECT_ATTRIBUTE};

use crate::{
    config::ProviderConfig,
    error::{Error, Result},
    provider::{
        AttributeType, CognitoClient, ConfirmSignUpOutput, IdentityProvider, InitiateAuthOutput,
        ResendConfirmationCodeOutput, SignUpOutput,
    },
};
use std::sync::Arc;
use tracing::{debug, instrument};

const EMAIL_ATTRIBUTE: &str = "email";

/// Inputs are only checked for presence; their content is the provider's call.
fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::required(field));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct SessionManager {
    config: Arc<ProviderConfig>,
    provider: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager talking to Cognito with `config`. No request is sent.
    ///
    /// # Errors
    /// Returns an error if the provider client cannot be built.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let provider = CognitoClient::new(&config)?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Create a manager from the `COGNITO_*` environment variables.
    ///
    /// # Errors
    /// Returns `Error::Configuration` naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        Self::new(ProviderConfig::from_env()?)
    }

    #[must_use]
    pub fn with_provider(config: ProviderConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn session_token<S>(&self, request: &S) -> Result<String>
    where
        S: TokenSource + ?Sized,
    {
        request
            .session_token(self.config.token_name())
            .ok_or(Error::Session)
    }

    /// Authenticate with username and password and store the issued access
    /// token on `carrier`.
    ///
    /// Nothing is written when the provider answers with a challenge instead of
    /// tokens, or when the call fails.
    ///
    /// # Errors
    /// `Error::Validation` for empty credentials (no provider call), otherwise
    /// the provider failure as `Error::Authentication`.
    #[instrument(skip(self, password, carrier))]
    pub async fn initiate_auth<C>(
        &self,
        username: &str,
        password: &str,
        carrier: &mut C,
    ) -> Result<InitiateAuthOutput>
    where
        C: SessionCarrier + ?Sized,
    {
        let username = require(username, "username")?;
        let password = require(password, "password")?;

        let output = self
            .provider
            .initiate_auth(self.config.client_id(), username, password)
            .await?;

        match output.access_token() {
            Some((token, expires_in)) => {
                carrier.write_session(&SessionCookie::issue(
                    self.config.token_name(),
                    token,
                    expires_in,
                    self.config.secure_cookie(),
                ))?;
                debug!("session issued, expires in {:?}s", expires_in);
            }
            None => debug!("no access token issued, challenge: {:?}", output.challenge_name),
        }

        Ok(output)
    }

    /// Resolve the request's session token into an identity.
    async fn resolve_identity<S>(&self, request: &S) -> Result<Identity>
    where
        S: TokenSource + ?Sized,
    {
        let token = self.session_token(request)?;
        let user = self.provider.get_user(&token).await?;
        Ok(Identity::from(user))
    }

    /// Lenient identity lookup for optional checks: missing username or `sub`
    /// come back as `None`.
    ///
    /// # Errors
    /// `Error::Session` when the request carries no token, or the provider failure.
    #[instrument(skip_all)]
    pub async fn get_server_side_user<S>(&self, request: &S) -> Result<Identity>
    where
        S: TokenSource + ?Sized,
    {
        self.resolve_identity(request).await
    }

    /// Strict identity lookup for code paths that need a trusted user.
    ///
    /// # Errors
    /// `Error::Session` when no token is present, `Error::Identity` when the
    /// provider omits the username or the `sub` attribute, or the provider failure.
    #[instrument(skip_all)]
    pub async fn authenticate<S>(&self, request: &S) -> Result<Principal>
    where
        S: TokenSource + ?Sized,
    {
        let identity = self.resolve_identity(request).await?;
        Principal::try_from(identity)
    }

    /// Revoke the session token provider-side, then clear it on `response`.
    ///
    /// If the provider call fails the response is left untouched.
    ///
    /// # Errors
    /// `Error::Session` when no token is present, or the provider failure.
    #[instrument(skip_all)]
    pub async fn sign_out<S, C>(&self, request: &S, response: &mut C) -> Result<()>
    where
        S: TokenSource + ?Sized,
        C: SessionCarrier + ?Sized,
    {
        let token = self.session_token(request)?;

        self.provider.global_sign_out(&token).await?;

        response.write_session(&SessionCookie::clear(
            self.config.token_name(),
            self.config.secure_cookie(),
        ))?;
        debug!("session cleared");

        Ok(())
    }

    /// Register a user with a single `email` attribute. Does not sign in.
    ///
    /// # Errors
    /// `Error::Validation` for missing input, or the provider failure.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<SignUpOutput> {
        let username = require(username, "username")?;
        let password = require(password, "password")?;
        let email = require(email, EMAIL_ATTRIBUTE)?;

        let output = self
            .provider
            .sign_up(
                self.config.client_id(),
                username,
                password,
                &[AttributeType::new(EMAIL_ATTRIBUTE, email)],
            )
            .await?;

        debug!("user registered, confirmed: {}", output.user_confirmed);

        Ok(output)
    }

    /// # Errors
    /// `Error::Validation` for missing input, or the provider failure.
    #[instrument(skip(self, confirmation_code))]
    pub async fn confirm_sign_up(
        &self,
        username: &str,
        confirmation_code: &str,
    ) -> Result<ConfirmSignUpOutput> {
        let username = require(username, "username")?;
        let confirmation_code = require(confirmation_code, "confirmation code")?;

        Ok(self
            .provider
            .confirm_sign_up(self.config.client_id(), username, confirmation_code)
            .await?)
    }

    /// # Errors
    /// `Error::Validation` for a missing username, or the provider failure.
    #[instrument(skip(self))]
    pub async fn resend_confirmation_code(
        &self,
        username: &str,
    ) -> Result<ResendConfirmationCodeOutput> {
        let username = require(username, "username")?;

        Ok(self
            .provider
            .resend_confirmation_code(self.config.client_id(), username)
            .await?)
    }
}
