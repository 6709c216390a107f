//! A multi-user bucketlist tracker served over a JSON HTTP API.
//!
//! Users register and log in for a signed bearer token, then manage their own
//! bucketlists and the items inside them. Persistence is SQLite via `sqlx`.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod serializers;
pub mod services;
pub mod validation;

use axum::Router;
use services::{
    auth_service::AuthService, bucketlist_service::BucketListService, token::TokenCodec,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub auth: AuthService,
    pub bucketlists: BucketListService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, tokens: TokenCodec) -> Self {
        Self {
            auth: AuthService::new(db.clone(), tokens),
            bucketlists: BucketListService::new(db.clone()),
            db,
        }
    }
}

/// Build the HTTP application (the same router the binary serves).
pub fn build_app(state: AppState) -> Router {
    routes::routes::routes(state)
}
