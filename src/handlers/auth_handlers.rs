//! Registration and login. Both answer with `{"Authorization": token}`.

use crate::{AppState, errors::AppError};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct CredentialsReq {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// `POST /api/v1.0/auth/register/`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsReq>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = payload?;
    let token = state
        .auth
        .register(body.username.as_deref(), body.password.as_deref())
        .await?;
    Ok(Json(json!({ "Authorization": token })))
}

/// `POST /api/v1.0/auth/login/`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsReq>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = payload?;
    let token = state
        .auth
        .login(body.username.as_deref(), body.password.as_deref())
        .await?;
    Ok(Json(json!({ "Authorization": token })))
}
