use crate::folio::storage::{active_profile, list_visible_experience, list_visible_skills};
use crate::models::{Experience, Profile, Skill};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SkillGroup {
    category: String,
    skills: Vec<Skill>,
}

/// Group skills by category, keeping the order in which categories first appear.
pub(crate) fn group_skills(skills: Vec<Skill>) -> Vec<SkillGroup> {
    let mut groups: Vec<SkillGroup> = Vec::new();

    for skill in skills {
        match groups.iter_mut().find(|g| g.category == skill.category) {
            Some(group) => group.skills.push(skill),
            None => groups.push(SkillGroup {
                category: skill.category.clone(),
                skills: vec![skill],
            }),
        }
    }

    groups
}

#[utoipa::path(
    get,
    path= "/api/profile",
    responses (
        (status = 200, description = "Active profile", body = Profile),
        (status = 404, description = "No active profile"),
        (status = 500, description = "Profile could not be fetched"),
    ),
    tag= "content"
)]
#[instrument(skip(pool))]
pub async fn profile(pool: Extension<PgPool>) -> impl IntoResponse {
    match active_profile(&pool).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(json!(profile))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Profile not found" })),
        ),
        Err(err) => {
            error!("Database error: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch profile" })),
            )
        }
    }
}

#[utoipa::path(
    get,
    path= "/api/skills",
    responses (
        (status = 200, description = "Visible skills grouped by category", body = [SkillGroup]),
        (status = 500, description = "Skills could not be fetched"),
    ),
    tag= "content"
)]
#[instrument(skip(pool))]
pub async fn skills(pool: Extension<PgPool>) -> impl IntoResponse {
    match list_visible_skills(&pool).await {
        Ok(skills) => {
            let total = skills.len();
            let categories = group_skills(skills);
            (
                StatusCode::OK,
                Json(json!({ "categories": categories, "total": total })),
            )
        }
        Err(err) => {
            error!("Database error: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch skills" })),
            )
        }
    }
}

#[utoipa::path(
    get,
    path= "/api/experience",
    responses (
        (status = 200, description = "Visible experience", body = [Experience]),
        (status = 500, description = "Experience could not be fetched"),
    ),
    tag= "content"
)]
#[instrument(skip(pool))]
pub async fn experience(pool: Extension<PgPool>) -> impl IntoResponse {
    match list_visible_experience(&pool).await {
        Ok(data) => {
            let total = data.len();
            (
                StatusCode::OK,
                Json(json!({ "data": data, "total": total })),
            )
        }
        Err(err) => {
            error!("Database error: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch experience" })),
            )
        }
    }
}
