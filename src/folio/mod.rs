#![allow(clippy::needless_for_each)]

use crate::folio::handlers::{
    contact, contact::__path_create_message, contact::__path_list_messages, content,
    content::__path_experience, content::__path_profile, content::__path_skills, health,
    health::__path_health, projects, projects::__path_create_project,
    projects::__path_list_projects,
};
use crate::models::{ContactMessage, Experience, Profile, Project, Skill};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::get,
    Extension, Json, Router,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;

pub(crate) mod handlers;
pub(crate) mod storage;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_projects,
        create_project,
        create_message,
        list_messages,
        profile,
        skills,
        experience
    ),
    components(schemas(
        health::Health,
        projects::NewProject,
        contact::ContactRequest,
        content::SkillGroup,
        Project,
        ContactMessage,
        Profile,
        Skill,
        Experience
    )),
    tags(
        (name = "folio", description = "Portfolio content API")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router around an existing pool.
pub fn router(pool: PgPool) -> Router {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/contact",
            get(contact::list_messages).post(contact::create_message),
        )
        .route("/api/profile", get(content::profile))
        .route("/api/skills", get(content::skills))
        .route("/api/experience", get(content::experience))
        .route("/openapi.json", get(|| async { Json(openapi()) }))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(pool.clone())),
        )
        .route("/health", get(health).options(health))
        .layer(Extension(pool))
}

/// Start the server
/// # Errors
/// Return error if failed to connect to the database or to start the server
pub async fn new(port: u16, dsn: String) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let app = router(pool);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
