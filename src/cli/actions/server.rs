use crate::folio;
use anyhow::Result;
use tracing::info;
use url::Url;

pub struct Args {
    pub port: u16,
    pub dsn: String,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &redact_dsn(&self.dsn))
            .finish()
    }
}

// Hide the password component of a connection string.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "***".to_string(),
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    info!(
        port = args.port,
        dsn = %redact_dsn(&args.dsn),
        "starting portfolio API"
    );

    folio::new(args.port, args.dsn).await
}
