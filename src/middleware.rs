use crate::{AppState, errors::AppError};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use base64::{Engine as _, engine::general_purpose};

/// Resolve the caller from the `Authorization` header and attach it to the
/// request as a `CurrentUser` extension. Any failure is a 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token(req.headers()) else {
        tracing::debug!("missing Authorization header on {}", req.uri().path());
        return Err(AppError::unauthorized());
    };

    let user = state.auth.authenticate(&token).await.map_err(|err| {
        tracing::warn!("rejected token on {}: {}", req.uri().path(), err);
        AppError::from(err)
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Accepts `Bearer <token>`, HTTP Basic with the token as the username, or
/// the bare token.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim_start();

    let token = match value.split_once(' ') {
        Some(("Bearer", bearer)) => bearer.trim().to_string(),
        Some(("Basic", basic)) => {
            let decoded = general_purpose::STANDARD.decode(basic.trim()).ok()?;
            let decoded = String::from_utf8(decoded).ok()?;
            decoded.split(':').next().unwrap_or_default().to_string()
        }
        _ => value.trim().to_string(),
    };

    (!token.is_empty()).then_some(token)
}
