use crate::cli::{
    actions::{admin, server, session, Action},
    commands::{admin as cmd, backend, server::CMD_SERVER},
    globals::GlobalArgs,
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;
use uuid::Uuid;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    if name == CMD_SERVER {
        let port = sub.get_one::<u16>("port").copied().unwrap_or(8080);
        let dsn = sub
            .get_one::<String>("dsn")
            .cloned()
            .context("missing required argument: --dsn")?;
        return Ok(Action::Server(server::Args { port, dsn }));
    }

    let globals = globals(sub)?;

    let action = match name {
        cmd::CMD_LOGIN => Action::Session(session::Args {
            globals,
            command: session::Command::Login {
                email: required::<String>(sub, "email")?,
                password: SecretString::from(required::<String>(sub, "password")?),
            },
        }),
        cmd::CMD_LOGOUT => Action::Session(session::Args {
            globals,
            command: session::Command::Logout,
        }),
        cmd::CMD_STATUS => Action::Session(session::Args {
            globals,
            command: session::Command::Status {
                validate: sub.get_flag("validate"),
            },
        }),
        cmd::CMD_MESSAGES => Action::Admin(admin::Args {
            globals,
            command: admin::Command::Messages {
                unread: sub.get_flag("unread"),
            },
        }),
        cmd::CMD_MARK_READ => Action::Admin(admin::Args {
            globals,
            command: admin::Command::MarkRead {
                id: required::<Uuid>(sub, "id")?,
            },
        }),
        cmd::CMD_DELETE_PROJECT => Action::Admin(admin::Args {
            globals,
            command: admin::Command::DeleteProject {
                id: required::<Uuid>(sub, "id")?,
            },
        }),
        cmd::CMD_UPLOAD => Action::Admin(admin::Args {
            globals,
            command: admin::Command::Upload {
                file: required::<PathBuf>(sub, "file")?,
                bucket: required::<String>(sub, "bucket")?,
                folder: required::<String>(sub, "folder")?,
            },
        }),
        cmd::CMD_PROJECTS => Action::Admin(admin::Args {
            globals,
            command: admin::Command::Projects,
        }),
        cmd::CMD_ADD_PROJECT => Action::Admin(admin::Args {
            globals,
            command: admin::Command::AddProject(new_project(sub)?),
        }),
        cmd::CMD_ADD_SKILL => Action::Admin(admin::Args {
            globals,
            command: admin::Command::AddSkill(admin::NewSkill {
                name: required::<String>(sub, "name")?,
                category: required::<String>(sub, "category")?,
                proficiency_level: required::<i32>(sub, "proficiency")?,
                is_visible: !sub.get_flag("hidden"),
            }),
        }),
        cmd::CMD_PROFILE => Action::Admin(admin::Args {
            globals,
            command: admin::Command::Profile(profile_fields(sub)?),
        }),
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .with_context(|| format!("missing required argument: {id}"))
}

fn optional(matches: &ArgMatches, id: &str) -> Option<String> {
    matches
        .get_one::<String>(id)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn new_project(matches: &ArgMatches) -> Result<admin::NewProject> {
    let technologies = matches
        .get_many::<String>("technologies")
        .into_iter()
        .flatten()
        .map(|tech| tech.trim())
        .filter(|tech| !tech.is_empty())
        .map(str::to_string)
        .collect();

    Ok(admin::NewProject {
        title: required::<String>(matches, "title")?,
        description: optional(matches, "description"),
        long_description: optional(matches, "long-description"),
        category: optional(matches, "category"),
        technologies,
        github_url: optional(matches, "github-url"),
        demo_url: optional(matches, "demo-url"),
        image_url: optional(matches, "image-url"),
        is_featured: matches.get_flag("featured"),
        is_visible: !matches.get_flag("hidden"),
    })
}

fn profile_fields(matches: &ArgMatches) -> Result<admin::ProfileFields> {
    let fields = admin::ProfileFields {
        name: optional(matches, "name"),
        title: optional(matches, "title"),
        bio: optional(matches, "bio"),
        email: optional(matches, "email"),
        location: optional(matches, "location"),
        github_url: optional(matches, "github-url"),
        linkedin_url: optional(matches, "linkedin-url"),
        profile_image_url: optional(matches, "profile-image-url"),
    };
    if fields == admin::ProfileFields::default() {
        return Err(anyhow!("nothing to change, pass at least one profile field"));
    }
    Ok(fields)
}

fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let supabase_url = matches
        .get_one::<String>(backend::ARG_SUPABASE_URL)
        .cloned()
        .context("missing required argument: --supabase-url (or FOLIO_SUPABASE_URL)")?;
    let supabase_key = matches
        .get_one::<String>(backend::ARG_SUPABASE_KEY)
        .cloned()
        .context("missing required argument: --supabase-key (or FOLIO_SUPABASE_KEY)")?;
    let state_dir = matches
        .get_one::<PathBuf>(backend::ARG_STATE_DIR)
        .cloned()
        .or_else(backend::default_state_dir)
        .context("could not determine a state directory, use --state-dir")?;

    Ok(GlobalArgs::new(
        supabase_url,
        SecretString::from(supabase_key),
        state_dir,
    ))
}
