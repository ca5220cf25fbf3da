//! Database helpers for the portfolio tables.

use crate::models::{ContactMessage, Experience, Profile, Project, Skill};
use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info_span, Instrument, Span};
use uuid::Uuid;

/// Validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewContactMessage {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) subject: String,
    pub(crate) message: String,
}

/// Validated project submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProjectDraft {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) technologies: Vec<String>,
    pub(crate) github_url: Option<String>,
    pub(crate) demo_url: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) is_featured: bool,
    pub(crate) is_visible: bool,
}

fn db_span(operation: &'static str, statement: &'static str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

pub(crate) async fn insert_contact_message(
    pool: &PgPool,
    message: &NewContactMessage,
) -> Result<Uuid> {
    let query = r"
        INSERT INTO contact_messages (name, email, subject, message, is_read)
        VALUES ($1, $2, $3, $4, false)
        RETURNING id";
    sqlx::query_scalar(query)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(pool)
        .instrument(db_span("INSERT", query))
        .await
        .context("failed to insert contact message")
}

pub(crate) async fn list_contact_messages(
    pool: &PgPool,
    unread_only: bool,
) -> Result<Vec<ContactMessage>> {
    let query = r"
        SELECT id, name, email, subject, message, is_read, created_at
        FROM contact_messages
        WHERE ($1 = false OR is_read = false)
        ORDER BY created_at DESC";
    sqlx::query_as(query)
        .bind(unread_only)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list contact messages")
}

pub(crate) async fn list_visible_projects(pool: &PgPool) -> Result<Vec<Project>> {
    let query = r"
        SELECT id, title, description, long_description, image_url, demo_url, github_url,
               category, technologies, is_featured, is_visible, sort_order, created_at, updated_at
        FROM projects
        WHERE is_visible = true
        ORDER BY sort_order, created_at DESC";
    sqlx::query_as(query)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list projects")
}

pub(crate) async fn insert_project(pool: &PgPool, draft: &ProjectDraft) -> Result<Project> {
    let query = r"
        INSERT INTO projects
            (title, description, category, technologies, github_url, demo_url, image_url,
             is_featured, is_visible)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, title, description, long_description, image_url, demo_url, github_url,
                  category, technologies, is_featured, is_visible, sort_order, created_at,
                  updated_at";
    sqlx::query_as(query)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(&draft.technologies)
        .bind(&draft.github_url)
        .bind(&draft.demo_url)
        .bind(&draft.image_url)
        .bind(draft.is_featured)
        .bind(draft.is_visible)
        .fetch_one(pool)
        .instrument(db_span("INSERT", query))
        .await
        .context("failed to insert project")
}

pub(crate) async fn active_profile(pool: &PgPool) -> Result<Option<Profile>> {
    let query = r"
        SELECT id, name, title, bio, profile_image_url, email, phone, location, linkedin_url,
               github_url, twitter_url, resume_url, is_active, created_at, updated_at
        FROM profile
        WHERE is_active = true
        ORDER BY updated_at DESC
        LIMIT 1";
    sqlx::query_as(query)
        .fetch_optional(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to lookup profile")
}

pub(crate) async fn list_visible_skills(pool: &PgPool) -> Result<Vec<Skill>> {
    let query = r"
        SELECT id, name, category, proficiency_level, icon_url, is_visible, sort_order,
               created_at, updated_at
        FROM skills
        WHERE is_visible = true
        ORDER BY sort_order";
    sqlx::query_as(query)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list skills")
}

pub(crate) async fn list_visible_experience(pool: &PgPool) -> Result<Vec<Experience>> {
    let query = r"
        SELECT id, company, position, description, start_date, end_date, is_current,
               company_logo_url, location, is_visible, sort_order, created_at, updated_at
        FROM experience
        WHERE is_visible = true
        ORDER BY sort_order";
    sqlx::query_as(query)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list experience")
}
