use crate::backend::objects::{DEFAULT_BUCKET, DEFAULT_FOLDER};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use uuid::Uuid;

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_STATUS: &str = "status";
pub const CMD_MESSAGES: &str = "messages";
pub const CMD_MARK_READ: &str = "mark-read";
pub const CMD_DELETE_PROJECT: &str = "delete-project";
pub const CMD_UPLOAD: &str = "upload";
pub const CMD_PROJECTS: &str = "projects";
pub const CMD_ADD_PROJECT: &str = "add-project";
pub const CMD_ADD_SKILL: &str = "add-skill";
pub const CMD_PROFILE: &str = "profile";

fn text(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).help(help)
}

fn hidden_flag(what: &'static str) -> Arg {
    Arg::new("hidden")
        .long("hidden")
        .help(format!("Create the {what} hidden from the public site"))
        .action(ArgAction::SetTrue)
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new(CMD_LOGIN)
            .about("Sign in as an administrator")
            .arg(
                Arg::new("email")
                    .long("email")
                    .help("Administrator email")
                    .env("FOLIO_ADMIN_EMAIL")
                    .required(true),
            )
            .arg(
                Arg::new("password")
                    .long("password")
                    .help("Administrator password")
                    .env("FOLIO_ADMIN_PASSWORD")
                    .hide_env_values(true)
                    .required(true),
            ),
        Command::new(CMD_LOGOUT).about("End the current admin session"),
        Command::new(CMD_STATUS)
            .about("Show the current admin session")
            .arg(
                Arg::new("validate")
                    .long("validate")
                    .help("Ask the server whether the session is still valid")
                    .action(ArgAction::SetTrue),
            ),
        Command::new(CMD_MESSAGES)
            .about("List contact messages, newest first")
            .arg(
                Arg::new("unread")
                    .long("unread")
                    .help("Only unread messages")
                    .action(ArgAction::SetTrue),
            ),
        Command::new(CMD_MARK_READ)
            .about("Mark a contact message as read")
            .arg(
                Arg::new("id")
                    .help("Message id")
                    .required(true)
                    .value_parser(clap::value_parser!(Uuid)),
            ),
        Command::new(CMD_DELETE_PROJECT)
            .about("Delete a project")
            .arg(
                Arg::new("id")
                    .help("Project id")
                    .required(true)
                    .value_parser(clap::value_parser!(Uuid)),
            ),
        Command::new(CMD_UPLOAD)
            .about("Upload an image and print its public URL")
            .arg(
                Arg::new("file")
                    .help("Image to upload")
                    .required(true)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("bucket")
                    .long("bucket")
                    .help("Storage bucket")
                    .default_value(DEFAULT_BUCKET),
            )
            .arg(
                Arg::new("folder")
                    .long("folder")
                    .help("Folder inside the bucket")
                    .default_value(DEFAULT_FOLDER),
            ),
        Command::new(CMD_PROJECTS)
            .about("List every project, hidden ones included, with dashboard counts"),
        Command::new(CMD_ADD_PROJECT)
            .about("Create a project")
            .arg(text("title", "Project title").required(true))
            .arg(text("description", "Short description"))
            .arg(text("long-description", "Full description"))
            .arg(text("category", "Project category"))
            .arg(
                Arg::new("technologies")
                    .long("technologies")
                    .help("Comma separated list, for example \"Rust, Postgres\"")
                    .value_delimiter(','),
            )
            .arg(text("github-url", "Repository URL"))
            .arg(text("demo-url", "Live demo URL"))
            .arg(text("image-url", "Cover image URL"))
            .arg(
                Arg::new("featured")
                    .long("featured")
                    .help("Show the project on the home page")
                    .action(ArgAction::SetTrue),
            )
            .arg(hidden_flag("project")),
        Command::new(CMD_ADD_SKILL)
            .about("Create a skill")
            .arg(text("name", "Skill name").required(true))
            .arg(text("category", "Skill category").required(true))
            .arg(
                Arg::new("proficiency")
                    .long("proficiency")
                    .help("Proficiency level, 0 to 100")
                    .default_value("3")
                    .value_parser(clap::value_parser!(i32).range(0..=100)),
            )
            .arg(hidden_flag("skill")),
        Command::new(CMD_PROFILE)
            .about("Update the profile, creating it when none exists")
            .arg(text("name", "Display name"))
            .arg(text("title", "Headline"))
            .arg(text("bio", "Biography"))
            .arg(text("email", "Public email"))
            .arg(text("location", "Location"))
            .arg(text("github-url", "GitHub profile URL"))
            .arg(text("linkedin-url", "LinkedIn profile URL"))
            .arg(text("profile-image-url", "Profile picture URL")),
    ]
}
