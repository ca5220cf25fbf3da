use super::non_blank;
use crate::folio::storage::{insert_project, list_visible_projects, ProjectDraft};
use crate::models::Project;
use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use utoipa::{IntoParams, ToSchema};

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct NewProject {
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    technologies: Option<Vec<String>>,
    github_url: Option<String>,
    demo_url: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    is_featured: bool,
    #[serde(default)]
    is_visible: bool,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectFilter {
    /// Exact category, `All` or absent for every category
    category: Option<String>,
    /// Only featured projects when `true`
    featured: Option<String>,
}

pub(crate) fn filter_projects(
    projects: Vec<Project>,
    category: Option<&str>,
    featured_only: bool,
) -> Vec<Project> {
    let category = category.filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);

    projects
        .into_iter()
        .filter(|project| match category {
            Some(category) => project.category.as_deref() == Some(category),
            None => true,
        })
        .filter(|project| !featured_only || project.is_featured)
        .collect()
}

/// Returns `None` when a required field is missing.
pub(crate) fn validate(project: NewProject) -> Option<ProjectDraft> {
    let technologies: Vec<String> = project
        .technologies
        .unwrap_or_default()
        .into_iter()
        .filter_map(|t| non_blank(Some(t)))
        .collect();

    if technologies.is_empty() {
        return None;
    }

    Some(ProjectDraft {
        title: non_blank(project.title)?,
        description: non_blank(project.description)?,
        category: non_blank(project.category)?,
        technologies,
        github_url: non_blank(project.github_url),
        demo_url: non_blank(project.demo_url),
        image_url: non_blank(project.image_url),
        is_featured: project.is_featured,
        is_visible: project.is_visible,
    })
}

#[utoipa::path(
    get,
    path= "/api/projects",
    params(ProjectFilter),
    responses (
        (status = 200, description = "Visible projects", body = [Project]),
        (status = 500, description = "Projects could not be fetched"),
    ),
    tag= "projects"
)]
#[instrument(skip(pool))]
pub async fn list_projects(
    pool: Extension<PgPool>,
    Query(filter): Query<ProjectFilter>,
) -> impl IntoResponse {
    match list_visible_projects(&pool).await {
        Ok(projects) => {
            let data = filter_projects(
                projects,
                filter.category.as_deref(),
                filter.featured.as_deref() == Some("true"),
            );
            let total = data.len();
            (
                StatusCode::OK,
                Json(json!({ "success": true, "data": data, "total": total })),
            )
        }
        Err(err) => {
            error!("Database error: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Failed to fetch projects" })),
            )
        }
    }
}

#[utoipa::path(
    post,
    path= "/api/projects",
    request_body = NewProject,
    responses (
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Project could not be created"),
    ),
    tag= "projects"
)]
#[instrument(skip(pool, payload))]
pub async fn create_project(
    pool: Extension<PgPool>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> impl IntoResponse {
    let draft = match payload {
        Ok(Json(project)) => validate(project),
        Err(rejection) => {
            debug!("rejected project payload: {rejection}");
            None
        }
    };

    let Some(draft) = draft else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Missing required fields" })),
        );
    };

    match insert_project(&pool, &draft).await {
        Ok(project) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "data": project,
                "message": "Project created successfully"
            })),
        ),
        Err(err) => {
            error!("Database error: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Failed to create project" })),
            )
        }
    }
}
