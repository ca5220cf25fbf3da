//! # Folio (portfolio API and admin session client)
//!
//! `folio` serves the public data behind a personal portfolio site (projects,
//! skills, experience, profile, contact form) and ships a small admin client
//! whose access is gated by a session manager.
//!
//! ## Admin sessions
//!
//! The [`session::SessionManager`] holds at most one admin session. Credential
//! checks, session creation, validation and invalidation are remote procedures
//! exposed by the hosted database; the manager only orchestrates them and keeps
//! the session in a local key-value store so it survives restarts.
//!
//! - **Best-effort logout:** the server-side invalidation result is ignored; local
//!   state is always cleared.
//! - **Server is the source of truth:** `expiresAt` is recorded but never checked
//!   locally. Staleness is resolved only by [`session::SessionManager::validate_session`].
//!
//! ## Public API
//!
//! `folio server` exposes read routes for the portfolio tables and unauthenticated
//! inserts for projects and contact messages, backed by a Postgres pool.

pub mod backend;
pub mod cli;
pub mod folio;
pub mod models;
pub mod session;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
