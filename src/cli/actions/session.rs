use crate::{
    backend::RestClient,
    cli::globals::GlobalArgs,
    session::{AdminUser, SessionManager, SessionProcedures},
    storage::{FileStore, LocalStore},
};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

#[derive(Debug)]
pub enum Command {
    Login {
        email: String,
        password: SecretString,
    },
    Logout,
    Status {
        validate: bool,
    },
}

/// What `folio status` prints.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AdminUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Manager over the backend client and the on-disk store in the state directory.
///
/// # Errors
/// Returns an error if the backend URL is invalid.
pub fn manager(globals: &GlobalArgs) -> Result<SessionManager<Arc<RestClient>, FileStore>> {
    let client = Arc::new(globals.client()?);
    Ok(SessionManager::new(client, globals.store()))
}

/// Report the held session, asking the server first when `validate` is set.
pub async fn status<P, S>(manager: &SessionManager<P, S>, validate: bool) -> StatusReport
where
    P: SessionProcedures,
    S: LocalStore,
{
    let authenticated = if validate {
        manager.validate_session().await
    } else {
        manager.is_authenticated()
    };

    match manager.session().filter(|_| authenticated) {
        Some(session) => StatusReport {
            authenticated: true,
            user: Some(session.user),
            expires_at: Some(session.expires_at),
        },
        None => StatusReport {
            authenticated: false,
            user: None,
            expires_at: None,
        },
    }
}

/// Execute a session command.
/// # Errors
/// Returns an error if the client cannot be built or the login is refused.
pub async fn execute(args: Args) -> Result<()> {
    let manager = manager(&args.globals)?;

    match args.command {
        Command::Login { email, password } => {
            let outcome = manager.login(&email, &password).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);

            if !outcome.success {
                return Err(anyhow!(outcome
                    .message
                    .unwrap_or_else(|| "Login failed".to_string())));
            }
            info!("logged in as {email}");
        }
        Command::Logout => {
            manager.logout().await;
            println!("Logged out");
        }
        Command::Status { validate } => {
            let report = status(&manager, validate).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
