//! HTTP handlers for `/api/v1.0/bucketlists/` and `/api/v1.0/bucketlists/{id}/`.

use super::{NO_CHANGES, delete_confirmation};
use crate::{
    AppState,
    errors::AppError,
    models::{
        bucketlist::{BucketListChanges, NewBucketList},
        user::CurrentUser,
    },
    pagination::{PageLinks, PageQuery, PageRequest, PageWindow, request_base_url},
    serializers::{BucketListView, bucketlist_view, bucketlist_views},
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

/// Body for creating or renaming a bucketlist.
#[derive(Debug, Deserialize)]
pub struct BucketListReq {
    pub list_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BucketListsResponse {
    pub bucketlists: Vec<BucketListView>,
    #[serde(flatten)]
    pub window: PageWindow,
    #[serde(flatten)]
    pub links: PageLinks,
}

/// GET `/bucketlists/`: the caller's lists, paginated, optionally `?q=name`.
pub async fn list_bucketlists(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    query: Result<Query<PageQuery>, QueryRejection>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Json<BucketListsResponse>, AppError> {
    let Query(query) = query?;
    let request = PageRequest::from_query(&query)?;
    let result = state
        .bucketlists
        .list_bucketlists(&user, query.q.as_deref(), request)
        .await?;

    let base = request_base_url(&headers, &uri)?;
    let links = PageLinks::build(&base, &result.page.window, query.q.as_deref().map(str::trim));

    Ok(Json(BucketListsResponse {
        bucketlists: bucketlist_views(&result.page.items, &result.items),
        window: result.page.window,
        links,
    }))
}

/// POST `/bucketlists/`: create a list owned by the caller.
pub async fn create_bucketlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<BucketListReq>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let new = NewBucketList::parse(body.list_name.as_deref())?;

    let created = state.bucketlists.create_bucketlist(&user, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(bucketlist_view(&created.list, &created.items)),
    ))
}

/// GET `/bucketlists/{id}/`
pub async fn get_bucketlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<BucketListView>, AppError> {
    let Path(id) = path?;
    let detail = state.bucketlists.get_bucketlist(&user, id).await?;
    Ok(Json(bucketlist_view(&detail.list, &detail.items)))
}

/// PUT `/bucketlists/{id}/`: rename a list.
pub async fn update_bucketlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BucketListReq>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = path?;
    let Json(body) = payload?;
    let changes = BucketListChanges::parse(body.list_name.as_deref())?;

    match state.bucketlists.update_bucketlist(&user, id, changes).await? {
        Updated::Unchanged => Ok(Json(json!({ "Message": NO_CHANGES }))),
        Updated::Changed(detail) => Ok(Json(json!({
            "Message": "Successfully updated bucketlist.",
            "bucketlist": bucketlist_view(&detail.list, &detail.items),
        }))),
    }
}

/// DELETE `/bucketlists/{id}/`: removes the list and all of its items.
pub async fn delete_bucketlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = path?;
    let deleted = state.bucketlists.delete_bucketlist(&user, id).await?;
    Ok(delete_confirmation(deleted))
}
