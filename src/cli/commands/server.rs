use clap::{Arg, Command};

pub const CMD_SERVER: &str = "server";

#[must_use]
pub fn subcommand() -> Command {
    Command::new(CMD_SERVER)
        .about("Serve the portfolio API")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("FOLIO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .env("FOLIO_DSN")
                .hide_env_values(true)
                .required(true),
        )
}
