use crate::{
    cli::actions::{server::Args, Action},
    config::ProviderConfig,
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if a required provider value is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let arg = |name: &str| matches.get_one::<String>(name).cloned();

    let config = ProviderConfig::new(
        arg("region"),
        arg("client-id"),
        arg("access-key-id"),
        arg("secret-access-key").map(SecretString::from),
    )
    .context("incomplete provider configuration")?;

    let config = match arg("endpoint").filter(|v| !v.trim().is_empty()) {
        Some(endpoint) => config.with_endpoint(endpoint),
        None => config,
    };

    let config = match arg("token-name").filter(|v| !v.trim().is_empty()) {
        Some(name) => config.with_token_name(name),
        None => config,
    };

    let config = config.with_secure_cookie(matches.get_flag("secure-cookie"));

    Ok(Action::Serve(Args { port, config }))
}
