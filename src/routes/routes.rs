//! Defines routes for every bucketlist API operation.
//!
//! ## Structure
//! Every `/api/v1.0` path is also served without its trailing slash.
//!
//! - **Public endpoints**
//!   - `GET  /healthz`, `GET /readyz`: liveness and readiness
//!   - `GET  /api/v1.0/`: welcome message
//!   - `POST /api/v1.0/auth/register/`, `POST /api/v1.0/auth/login/`
//!
//! - **Authenticated endpoints** (behind `require_auth`)
//!   - `GET|POST            /api/v1.0/bucketlists/`
//!   - `GET|PUT|DELETE      /api/v1.0/bucketlists/{id}/`
//!   - `GET|POST            /api/v1.0/bucketlists/{id}/items/`
//!   - `GET|PUT|DELETE      /api/v1.0/bucketlists/{id}/items/{item_id}/`
//!   - `GET                 /api/v1.0/users/me/`

use crate::{
    AppState,
    errors::AppError,
    handlers::{
        auth_handlers::{login, register},
        bucketlist_handlers::{
            create_bucketlist, delete_bucketlist, get_bucketlist, list_bucketlists,
            update_bucketlist,
        },
        health_handlers::{healthz, index, readyz},
        item_handlers::{create_item, delete_item, get_item, list_items, update_item},
        user_handlers::me,
    },
    middleware::require_auth,
};
use axum::{
    Router,
    http::{
        Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn_with_state,
    routing::{MethodRouter, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the full application router with shared state applied.
pub fn routes(state: AppState) -> Router {
    let protected = [
        (
            "/api/v1.0/bucketlists",
            get(list_bucketlists).post(create_bucketlist),
        ),
        (
            "/api/v1.0/bucketlists/{id}",
            get(get_bucketlist)
                .put(update_bucketlist)
                .delete(delete_bucketlist),
        ),
        (
            "/api/v1.0/bucketlists/{id}/items",
            get(list_items).post(create_item),
        ),
        (
            "/api/v1.0/bucketlists/{id}/items/{item_id}",
            get(get_item).put(update_item).delete(delete_item),
        ),
        ("/api/v1.0/users/me", get(me)),
    ]
    .into_iter()
    .fold(Router::new(), |router, (path, handler)| {
        with_and_without_slash(router, path, handler)
    })
    .route_layer(from_fn_with_state(state.clone(), require_auth));

    let public = [
        ("/api/v1.0", get(index)),
        ("/api/v1.0/auth/register", post(register)),
        ("/api/v1.0/auth/login", post(login)),
    ]
    .into_iter()
    .fold(Router::new(), |router, (path, handler)| {
        with_and_without_slash(router, path, handler)
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(public)
        .merge(protected)
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// API paths answer both as `/path/` and `/path`.
fn with_and_without_slash(
    router: Router<AppState>,
    path: &str,
    handler: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(&format!("{}/", path), handler.clone())
        .route(path, handler)
}

async fn not_found() -> AppError {
    AppError::not_found("The requested resource does not exist.")
}
