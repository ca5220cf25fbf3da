use crate::{
    backend::{
        objects::{content_type_for, object_name, MAX_UPLOAD_BYTES},
        RestClient,
    },
    cli::{actions::session::manager, globals::GlobalArgs},
    models::{ContactMessage, Profile, Project, Skill},
};
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use url::Url;
use uuid::Uuid;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

#[derive(Debug)]
pub enum Command {
    Messages {
        unread: bool,
    },
    MarkRead {
        id: Uuid,
    },
    DeleteProject {
        id: Uuid,
    },
    Upload {
        file: PathBuf,
        bucket: String,
        folder: String,
    },
    Projects,
    AddProject(NewProject),
    AddSkill(NewSkill),
    Profile(ProfileFields),
}

/// Row sent to `projects` by `folio add-project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub category: Option<String>,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub is_visible: bool,
}

/// Row sent to `skills` by `folio add-skill`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSkill {
    pub name: String,
    pub category: String,
    pub proficiency_level: i32,
    pub is_visible: bool,
}

/// Profile columns set by `folio profile`; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// Counts shown at the top of the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    pub published_projects: usize,
    pub unread_messages: usize,
    pub total_skills: usize,
}

impl DashboardStats {
    #[must_use]
    pub fn new(projects: &[Project], messages: &[ContactMessage], skills: &[Skill]) -> Self {
        Self {
            total_projects: projects.len(),
            published_projects: projects.iter().filter(|p| p.is_visible).count(),
            unread_messages: messages.iter().filter(|m| !m.is_read).count(),
            total_skills: skills.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub projects: Vec<Project>,
}

/// Contact messages, newest first.
///
/// # Errors
/// Returns an error if the backend call fails.
pub async fn messages(client: &RestClient, unread_only: bool) -> Result<Vec<ContactMessage>> {
    let mut query = client.from("contact_messages");
    if unread_only {
        query = query.eq("is_read", false);
    }
    Ok(query.order("created_at", false).select().await?)
}

/// # Errors
/// Returns an error if the backend call fails or no message has this id.
pub async fn mark_read(client: &RestClient, id: Uuid) -> Result<ContactMessage> {
    let updated: Vec<ContactMessage> = client
        .from("contact_messages")
        .eq("id", id)
        .update(&json!({ "is_read": true }))
        .await?;

    updated
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("message {id} not found"))
}

/// # Errors
/// Returns an error if the backend call fails.
pub async fn delete_project(client: &RestClient, id: Uuid) -> Result<()> {
    client.from("projects").eq("id", id).delete().await?;
    Ok(())
}

/// Every project, hidden ones included, newest first, with the dashboard counts.
///
/// # Errors
/// Returns an error if any backend call fails.
pub async fn projects(client: &RestClient) -> Result<Dashboard> {
    let (projects, messages, skills) = tokio::try_join!(
        client.from("projects").order("created_at", false).select::<Project>(),
        client.from("contact_messages").select::<ContactMessage>(),
        client.from("skills").order("sort_order", true).select::<Skill>(),
    )?;

    Ok(Dashboard {
        stats: DashboardStats::new(&projects, &messages, &skills),
        projects,
    })
}

/// # Errors
/// Returns an error if the title is blank or the backend refuses the row.
pub async fn add_project(client: &RestClient, project: &NewProject) -> Result<Project> {
    if project.title.trim().is_empty() {
        bail!("project title must not be empty");
    }

    let created: Vec<Project> = client
        .from("projects")
        .insert(std::slice::from_ref(project))
        .await?;

    created
        .into_iter()
        .next()
        .context("backend returned no project row")
}

/// # Errors
/// Returns an error if the name or category is blank or the backend refuses the row.
pub async fn add_skill(client: &RestClient, skill: &NewSkill) -> Result<Skill> {
    if skill.name.trim().is_empty() || skill.category.trim().is_empty() {
        bail!("skill name and category must not be empty");
    }

    let created: Vec<Skill> = client
        .from("skills")
        .insert(std::slice::from_ref(skill))
        .await?;

    created
        .into_iter()
        .next()
        .context("backend returned no skill row")
}

/// Update the existing profile, or create it when the table is empty.
///
/// # Errors
/// Returns an error if a new profile has no name or a backend call fails.
pub async fn save_profile(client: &RestClient, fields: &ProfileFields) -> Result<Profile> {
    let existing: Vec<Profile> = client.from("profile").select().await?;

    let saved: Vec<Profile> = match existing.first() {
        Some(profile) => {
            debug!("updating profile {}", profile.id);
            client
                .from("profile")
                .eq("id", profile.id)
                .update(fields)
                .await?
        }
        None => {
            let named = fields
                .name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty());
            if !named {
                bail!("no profile exists yet, --name is required to create one");
            }
            debug!("creating profile");
            client
                .from("profile")
                .insert(std::slice::from_ref(fields))
                .await?
        }
    };

    saved
        .into_iter()
        .next()
        .context("backend returned no profile row")
}

/// Upload an image file and return its public URL.
///
/// # Errors
/// Returns an error if the file is not a supported image, is larger than the
/// upload limit, cannot be read, or the backend refuses it.
#[instrument(skip(client))]
pub async fn upload(client: &RestClient, file: &Path, bucket: &str, folder: &str) -> Result<Url> {
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("invalid file name: {}", file.display()))?;

    let Some(content_type) = content_type_for(file_name) else {
        bail!("{file_name} is not a supported image type");
    };

    let metadata = tokio::fs::metadata(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    if metadata.len() > MAX_UPLOAD_BYTES as u64 {
        bail!(
            "File size exceeds {}MB limit",
            MAX_UPLOAD_BYTES / 1024 / 1024
        );
    }

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let object = object_name(folder, file_name, Utc::now().timestamp_millis());
    debug!("uploading {} bytes as {bucket}/{object}", bytes.len());

    let stored = client.upload(bucket, &object, bytes, content_type).await?;

    Ok(client.public_url(bucket, &stored)?)
}

/// Execute an admin command once the held session is confirmed by the server.
/// # Errors
/// Returns an error if there is no valid session or the command fails.
pub async fn execute(args: Args) -> Result<()> {
    let manager = manager(&args.globals)?;
    if !manager.validate_session().await {
        bail!("not logged in, run `folio login` first");
    }

    let client = args.globals.client()?;
    debug!(backend = %client.base_url(), "admin session confirmed");

    match args.command {
        Command::Messages { unread } => {
            let messages = messages(&client, unread).await?;
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
        Command::MarkRead { id } => {
            let message = mark_read(&client, id).await?;
            info!("marked message {} as read", message.id);
            println!("{}", serde_json::to_string_pretty(&message)?);
        }
        Command::DeleteProject { id } => {
            delete_project(&client, id).await?;
            info!("deleted project {id}");
            println!("{}", json!({ "deleted": id }));
        }
        Command::Upload {
            file,
            bucket,
            folder,
        } => {
            let url = upload(&client, &file, &bucket, &folder).await?;
            println!("{}", Value::String(url.to_string()));
        }
        Command::Projects => {
            let dashboard = projects(&client).await?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        Command::AddProject(project) => {
            let project = add_project(&client, &project).await?;
            info!("created project {}", project.id);
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        Command::AddSkill(skill) => {
            let skill = add_skill(&client, &skill).await?;
            info!("created skill {}", skill.id);
            println!("{}", serde_json::to_string_pretty(&skill)?);
        }
        Command::Profile(fields) => {
            let profile = save_profile(&client, &fields).await?;
            info!("saved profile {}", profile.id);
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::net::TcpListener;
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(server: &MockServer) -> RestClient {
        RestClient::new(&server.uri(), SecretString::from("anon".to_string())).unwrap()
    }

    fn message_json(id: Uuid, is_read: bool) -> Value {
        json!({
            "id": id,
            "name": "Ada",
            "email": "ada@example.com",
            "subject": "Hello",
            "message": "Hi there",
            "is_read": is_read,
            "created_at": "2024-05-01T10:00:00.123+00:00"
        })
    }

    fn project_json(id: Uuid, title: &str, is_visible: bool) -> Value {
        json!({
            "id": id,
            "title": title,
            "description": "A portfolio site",
            "long_description": null,
            "image_url": null,
            "demo_url": null,
            "github_url": "https://github.com/ada/folio",
            "category": "web",
            "technologies": ["Rust", "Postgres"],
            "is_featured": false,
            "is_visible": is_visible,
            "sort_order": 0,
            "created_at": "2024-05-01T10:00:00+00:00",
            "updated_at": "2024-05-01T10:00:00+00:00"
        })
    }

    fn skill_json(id: Uuid) -> Value {
        json!({
            "id": id,
            "name": "Rust",
            "category": "Languages",
            "proficiency_level": 4,
            "icon_url": null,
            "is_visible": true,
            "sort_order": 0,
            "created_at": "2024-05-01T10:00:00+00:00",
            "updated_at": "2024-05-01T10:00:00+00:00"
        })
    }

    fn profile_json(id: Uuid, title: &str) -> Value {
        json!({
            "id": id,
            "name": "Ada",
            "title": title,
            "bio": null,
            "profile_image_url": null,
            "email": "ada@example.com",
            "phone": null,
            "location": null,
            "linkedin_url": null,
            "github_url": null,
            "twitter_url": null,
            "resume_url": null,
            "is_active": true,
            "created_at": "2024-05-01T10:00:00+00:00",
            "updated_at": "2024-05-01T10:00:00+00:00"
        })
    }

    fn unreachable_client() -> RestClient {
        RestClient::new(
            "http://127.0.0.1:1",
            SecretString::from("anon".to_string()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_messages_unread_newest_first() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/contact_messages"))
            .and(query_param("is_read", "eq.false"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([message_json(id, false)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let messages = messages(&client(&server), true).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, id);
        assert!(!messages[0].is_read);
    }

    #[tokio::test]
    async fn test_mark_read() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/contact_messages"))
            .and(query_param("id", format!("eq.{id}")))
            .and(body_json(json!({ "is_read": true })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([message_json(id, true)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let message = mark_read(&client(&server), id).await.unwrap();
        assert!(message.is_read);
    }

    #[tokio::test]
    async fn test_mark_read_missing() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/contact_messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = mark_read(&client(&server), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_delete_project() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/projects"))
            .and(query_param("id", format!("eq.{id}")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        delete_project(&client(&server), id).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("avatar.png");
        std::fs::write(&file, b"\x89PNG").unwrap();

        Mock::given(method("POST"))
            .and(header("x-upsert", "false"))
            .and(header("content-type", "image/png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "Key": "portfolio/profile/1.png" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = upload(&client(&server), &file, "portfolio", "profile")
            .await
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!(
                "{}/storage/v1/object/public/portfolio/profile/1.png",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, b"hello").unwrap();

        let err = upload(&unreachable_client(), &file, "portfolio", "profile")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a supported image type"));
    }

    #[tokio::test]
    async fn test_upload_rejects_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("huge.jpg");
        std::fs::write(&file, vec![0_u8; MAX_UPLOAD_BYTES + 1]).unwrap();

        let err = upload(&unreachable_client(), &file, "portfolio", "profile")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("5MB"));
    }

    #[tokio::test]
    async fn test_projects_include_hidden_with_stats() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let (newest, older) = (Uuid::new_v4(), Uuid::new_v4());

        Mock::given(method("GET"))
            .and(path("/rest/v1/projects"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                project_json(newest, "Draft", false),
                project_json(older, "Folio", true)
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/contact_messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                message_json(Uuid::new_v4(), false),
                message_json(Uuid::new_v4(), true)
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/skills"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([skill_json(Uuid::new_v4())])),
            )
            .mount(&server)
            .await;

        let dashboard = projects(&client(&server)).await.unwrap();
        let ids: Vec<Uuid> = dashboard.projects.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![newest, older]);
        assert_eq!(
            dashboard.stats,
            DashboardStats {
                total_projects: 2,
                published_projects: 1,
                unread_messages: 1,
                total_skills: 1,
            }
        );
        assert_eq!(
            serde_json::to_value(dashboard.stats).unwrap()["publishedProjects"],
            1
        );
    }

    #[tokio::test]
    async fn test_add_project() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        let project = NewProject {
            title: "Folio".to_string(),
            description: Some("A portfolio site".to_string()),
            long_description: None,
            category: Some("web".to_string()),
            technologies: vec!["Rust".to_string(), "Postgres".to_string()],
            github_url: Some("https://github.com/ada/folio".to_string()),
            demo_url: None,
            image_url: None,
            is_featured: false,
            is_visible: true,
        };

        Mock::given(method("POST"))
            .and(path("/rest/v1/projects"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!([{
                "title": "Folio",
                "description": "A portfolio site",
                "long_description": null,
                "category": "web",
                "technologies": ["Rust", "Postgres"],
                "github_url": "https://github.com/ada/folio",
                "demo_url": null,
                "image_url": null,
                "is_featured": false,
                "is_visible": true
            }])))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!([project_json(id, "Folio", true)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = add_project(&client(&server), &project).await.unwrap();
        assert_eq!(created.id, id);
        assert_eq!(created.technologies, vec!["Rust", "Postgres"]);
    }

    #[tokio::test]
    async fn test_add_project_rejects_blank_title() {
        let project = NewProject {
            title: "  ".to_string(),
            description: None,
            long_description: None,
            category: None,
            technologies: Vec::new(),
            github_url: None,
            demo_url: None,
            image_url: None,
            is_featured: false,
            is_visible: true,
        };
        let err = add_project(&unreachable_client(), &project)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[tokio::test]
    async fn test_add_skill() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/rest/v1/skills"))
            .and(body_json(json!([{
                "name": "Rust",
                "category": "Languages",
                "proficiency_level": 4,
                "is_visible": true
            }])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([skill_json(id)])))
            .expect(1)
            .mount(&server)
            .await;

        let skill = NewSkill {
            name: "Rust".to_string(),
            category: "Languages".to_string(),
            proficiency_level: 4,
            is_visible: true,
        };
        let created = add_skill(&client(&server), &skill).await.unwrap();
        assert_eq!(created.id, id);
    }

    #[tokio::test]
    async fn test_profile_updates_existing_row() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/profile"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([profile_json(id, "Engineer")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/profile"))
            .and(query_param("id", format!("eq.{id}")))
            .and(body_json(json!({ "title": "Staff Engineer" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([profile_json(id, "Staff Engineer")])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/profile"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let fields = ProfileFields {
            title: Some("Staff Engineer".to_string()),
            ..ProfileFields::default()
        };
        let profile = save_profile(&client(&server), &fields).await.unwrap();
        assert_eq!(profile.title.as_deref(), Some("Staff Engineer"));
    }

    #[tokio::test]
    async fn test_profile_created_when_missing() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/profile"))
            .and(body_json(json!([{ "name": "Ada", "title": "Engineer" }])))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!([profile_json(id, "Engineer")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fields = ProfileFields {
            name: Some("Ada".to_string()),
            title: Some("Engineer".to_string()),
            ..ProfileFields::default()
        };
        let profile = save_profile(&client(&server), &fields).await.unwrap();
        assert_eq!(profile.id, id);
    }

    #[tokio::test]
    async fn test_profile_creation_requires_name() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/profile"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let fields = ProfileFields {
            bio: Some("Hello".to_string()),
            ..ProfileFields::default()
        };
        let err = save_profile(&client(&server), &fields).await.unwrap_err();
        assert!(err.to_string().contains("--name"));
    }

    #[tokio::test]
    async fn test_execute_requires_session() {
        if !can_bind_localhost() {
            return;
        }
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("GET"))
            .and(path("/rest/v1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let args = Args {
            globals: GlobalArgs::new(
                server.uri(),
                SecretString::from("anon".to_string()),
                dir.path().to_path_buf(),
            ),
            command: Command::Projects,
        };
        let err = execute(args).await.unwrap_err();
        assert!(err.to_string().contains("not logged in"));
    }
}
