//! HTTP handlers for items nested under `/api/v1.0/bucketlists/{id}/items/`.

use super::{NO_CHANGES, delete_confirmation};
use crate::{
    AppState,
    errors::AppError,
    models::{
        item::{ItemChanges, NewItem},
        user::CurrentUser,
    },
    pagination::{PageLinks, PageQuery, PageRequest, PageWindow, request_base_url},
    serializers::{ItemView, item_view},
    services::bucketlist_service::Updated,
};
use axum::{
    Extension, Json,
    extract::{
        OriginalUri, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// `done` may arrive as a JSON boolean or as the strings `"true"`/`"false"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DoneFlag {
    Bool(bool),
    Text(String),
}

impl DoneFlag {
    pub fn as_bool(&self) -> bool {
        match self {
            DoneFlag::Bool(done) => *done,
            DoneFlag::Text(text) => text.trim().eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemReq {
    pub item_name: Option<String>,
    pub priority: Option<String>,
    pub done: Option<DoneFlag>,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<ItemView>,
    #[serde(flatten)]
    pub window: PageWindow,
    #[serde(flatten)]
    pub links: PageLinks,
}

/// GET `/bucketlists/{id}/items/`
pub async fn list_items(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Json<ItemsResponse>, AppError> {
    let Path(list_id) = path?;
    let Query(query) = query?;
    let request = PageRequest::from_query(&query)?;
    let page = state.bucketlists.list_items(&user, list_id, request).await?;

    let base = request_base_url(&headers, &uri)?;
    let links = PageLinks::build(&base, &page.window, None);

    Ok(Json(ItemsResponse {
        items: page.items.iter().map(item_view).collect(),
        window: page.window,
        links,
    }))
}

/// POST `/bucketlists/{id}/items/`: new items always start not done.
pub async fn create_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ItemReq>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(list_id) = path?;
    let Json(body) = payload?;
    let new = NewItem::parse(body.item_name.as_deref(), body.priority.as_deref())?;

    let item = state.bucketlists.create_item(&user, list_id, new).await?;
    Ok((StatusCode::CREATED, Json(json!({ "item": item_view(&item) }))))
}

/// GET `/bucketlists/{id}/items/{item_id}/`
pub async fn get_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<ItemView>, AppError> {
    let Path((list_id, item_id)) = path?;
    let item = state.bucketlists.get_item(&user, list_id, item_id).await?;
    Ok(Json(item_view(&item)))
}

/// PUT `/bucketlists/{id}/items/{item_id}/`: any of name, priority, done.
pub async fn update_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<ItemReq>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Path((list_id, item_id)) = path?;
    let Json(body) = payload?;
    let changes = ItemChanges::parse(
        body.item_name.as_deref(),
        body.priority.as_deref(),
        body.done.as_ref().map(DoneFlag::as_bool),
    )?;

    match state
        .bucketlists
        .update_item(&user, list_id, item_id, changes)
        .await?
    {
        Updated::Unchanged => Ok(Json(json!({ "Message": NO_CHANGES }))),
        Updated::Changed(item) => Ok(Json(json!({
            "Message": "Successfully updated item.",
            "item": item_view(&item),
        }))),
    }
}

/// DELETE `/bucketlists/{id}/items/{item_id}/`
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path((list_id, item_id)) = path?;
    let deleted = state.bucketlists.delete_item(&user, list_id, item_id).await?;
    Ok(delete_confirmation(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_accepts_booleans_and_strings() {
        let body: ItemReq = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert!(body.done.unwrap().as_bool());

        let body: ItemReq = serde_json::from_str(r#"{"done": "TRUE"}"#).unwrap();
        assert!(body.done.unwrap().as_bool());

        let body: ItemReq = serde_json::from_str(r#"{"done": "no"}"#).unwrap();
        assert!(!body.done.unwrap().as_bool());

        let body: ItemReq = serde_json::from_str(r#"{"item_name": "Kyoto"}"#).unwrap();
        assert!(body.done.is_none());
    }
}
