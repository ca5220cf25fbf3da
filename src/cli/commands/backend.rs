use clap::{Arg, Command};
use std::path::PathBuf;

pub const ARG_SUPABASE_URL: &str = "supabase-url";
pub const ARG_SUPABASE_KEY: &str = "supabase-key";
pub const ARG_STATE_DIR: &str = "state-dir";

/// Where the admin session is kept when `--state-dir` is not given.
#[must_use]
pub fn default_state_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SUPABASE_URL)
                .long(ARG_SUPABASE_URL)
                .help("Backend project URL, example: https://<project>.supabase.co")
                .env("FOLIO_SUPABASE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SUPABASE_KEY)
                .long(ARG_SUPABASE_KEY)
                .help("Backend anon API key")
                .env("FOLIO_SUPABASE_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long(ARG_STATE_DIR)
                .help("Directory holding the persisted admin session")
                .env("FOLIO_STATE_DIR")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
}
