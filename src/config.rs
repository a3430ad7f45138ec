//! Provider configuration.
//!
//! All four provider values are required; a `ProviderConfig` only exists once
//! every one of them is present, so a half-configured manager cannot be built.

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::env;

pub const ENV_REGION: &str = "COGNITO_REGION";
pub const ENV_CLIENT_ID: &str = "COGNITO_CLIENT_ID";
pub const ENV_ACCESS_KEY_ID: &str = "COGNITO_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "COGNITO_SECRET_ACCESS_KEY";
pub const ENV_ENDPOINT: &str = "COGNITO_ENDPOINT";
pub const ENV_TOKEN_NAME: &str = "COGNITO_TOKEN_NAME";

pub const DEFAULT_TOKEN_NAME: &str = "cognito_session";

/// Access key pair used to sign provider requests.
#[derive(Clone)]
pub struct ProviderCredentials {
    access_key_id: String,
    secret_access_key: SecretString,
}

impl ProviderCredentials {
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    #[must_use]
    pub fn secret_access_key(&self) -> &SecretString {
        &self.secret_access_key
    }
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    region: String,
    client_id: String,
    credentials: ProviderCredentials,
    endpoint: Option<String>,
    token_name: String,
    secure_cookie: bool,
}

fn required(value: Option<String>, name: &'static str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(Error::Configuration(name)),
    }
}

impl ProviderConfig {
    /// Build a configuration from the four required values.
    ///
    /// # Errors
    /// Returns `Error::Configuration` naming the first missing (or blank) value,
    /// checked in the order region, client id, access key id, secret access key.
    pub fn new(
        region: Option<String>,
        client_id: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<SecretString>,
    ) -> Result<Self> {
        let region = required(region, "region")?;
        let client_id = required(client_id, "client id")?;
        let access_key_id = required(access_key_id, "access key id")?;
        let secret_access_key = match secret_access_key {
            Some(secret) if !secret.expose_secret().trim().is_empty() => secret,
            _ => return Err(Error::Configuration("secret access key")),
        };

        Ok(Self {
            region,
            client_id,
            credentials: ProviderCredentials {
                access_key_id,
                secret_access_key,
            },
            endpoint: None,
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            secure_cookie: false,
        })
    }

    /// Load the configuration through `lookup`, keyed by the `COGNITO_*` names.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if a required value is missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::new(
            lookup(ENV_REGION),
            lookup(ENV_CLIENT_ID),
            lookup(ENV_ACCESS_KEY_ID),
            lookup(ENV_SECRET_ACCESS_KEY).map(SecretString::from),
        )?;

        let config = match lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            Some(endpoint) => config.with_endpoint(endpoint),
            None => config,
        };

        Ok(match lookup(ENV_TOKEN_NAME).filter(|v| !v.trim().is_empty()) {
            Some(name) => config.with_token_name(name),
            None => config,
        })
    }

    /// Load the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if a required variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Send provider requests to `endpoint` instead of the regional Cognito URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    #[must_use]
    pub fn with_token_name(mut self, token_name: String) -> Self {
        self.token_name = token_name;
        self
    }

    #[must_use]
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn credentials(&self) -> &ProviderCredentials {
        &self.credentials
    }

    #[must_use]
    pub fn token_name(&self) -> &str {
        &self.token_name
    }

    #[must_use]
    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    /// Provider endpoint, defaulting to the regional Cognito user pool API.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.region))
    }
}
