use crate::{api, config::ProviderConfig, session::SessionManager};
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub config: ProviderConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the provider client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    info!(
        port = args.port,
        region = args.config.region(),
        endpoint = %args.config.endpoint(),
        token_name = args.config.token_name(),
        secure_cookie = args.config.secure_cookie(),
        "starting {} {}",
        env!("CARGO_PKG_NAME"),
        crate::GIT_COMMIT_HASH
    );

    let manager =
        SessionManager::new(args.config).context("could not build the Cognito client")?;

    api::new(args.port, manager).await
}
