use crate::{backend::RestClient, storage::FileStore};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// Backend connection and local state shared by the admin commands.
#[derive(Clone)]
pub struct GlobalArgs {
    pub supabase_url: String,
    pub supabase_key: SecretString,
    pub state_dir: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(supabase_url: String, supabase_key: SecretString, state_dir: PathBuf) -> Self {
        Self {
            supabase_url,
            supabase_key,
            state_dir,
        }
    }

    /// # Errors
    /// Returns an error if the backend URL is invalid.
    pub fn client(&self) -> Result<RestClient> {
        RestClient::new(&self.supabase_url, self.supabase_key.clone())
            .with_context(|| format!("invalid backend URL: {}", self.supabase_url))
    }

    #[must_use]
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.state_dir)
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &"***")
            .field("state_dir", &self.state_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn globals() -> GlobalArgs {
        GlobalArgs::new(
            "https://project.supabase.co".to_string(),
            SecretString::from("anon-key".to_string()),
            PathBuf::from("/tmp/folio"),
        )
    }

    #[test]
    fn test_global_args() {
        let args = globals();
        assert_eq!(args.supabase_url, "https://project.supabase.co");
        assert_eq!(args.supabase_key.expose_secret(), "anon-key");
        assert_eq!(args.store().dir(), PathBuf::from("/tmp/folio"));
        assert!(args.client().is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", globals());
        assert!(debug.contains("***"));
        assert!(!debug.contains("anon-key"));
    }

    #[test]
    fn test_invalid_url() {
        let args = GlobalArgs::new(
            "not a url".to_string(),
            SecretString::from("k".to_string()),
            PathBuf::from("."),
        );
        assert!(args.client().is_err());
    }
}
