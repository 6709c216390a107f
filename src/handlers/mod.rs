//! HTTP handlers. Each one parses its request, calls a service with the
//! caller's `CurrentUser`, and projects the result through `serializers`.

pub mod auth_handlers;
pub mod bucketlist_handlers;
pub mod health_handlers;
pub mod item_handlers;
pub mod user_handlers;

use axum::Json;
use serde_json::{Value, json};

pub(crate) const NO_CHANGES: &str = "No fields were changed.";

/// The shared confirmation body for every delete endpoint.
pub(crate) fn delete_confirmation(deleted: Option<String>) -> Json<Value> {
    match deleted {
        Some(name) => Json(json!({ "Message": format!("Successfully deleted {}", name) })),
        None => Json(json!({ "Message": "The delete was unsuccessful." })),
    }
}
