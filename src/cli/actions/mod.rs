//! Work the binary performs once its arguments are resolved.

use crate::cli::telemetry;

pub mod server;

#[derive(Debug)]
pub enum Action {
    /// Serve the session API until interrupted.
    Serve(server::Args),
}

impl Action {
    /// Run the action, then flush any exported spans whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns the action's own error.
    pub async fn execute(self) -> anyhow::Result<()> {
        let result = match self {
            Self::Serve(args) => server::execute(args).await,
        };

        telemetry::shutdown_tracer();

        result
    }
}
