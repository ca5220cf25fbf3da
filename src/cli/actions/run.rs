use crate::cli::actions::{admin, server, session, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
        Action::Session(args) => session::execute(args).await,
        Action::Admin(args) => admin::execute(args).await,
    }
}
