use crate::{
    AppState,
    errors::AppError,
    models::user::CurrentUser,
    serializers::{UserView, bucketlist_view, user_view},
};
use axum::{Extension, Json, extract::State};

/// `GET /api/v1.0/users/me/`: the caller with every list and item nested.
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserView>, AppError> {
    let record = state.auth.current_user(&user).await?;
    let lists = state.bucketlists.all_bucketlists(&user).await?;
    let views = lists
        .iter()
        .map(|detail| bucketlist_view(&detail.list, &detail.items))
        .collect();
    Ok(Json(user_view(&record, views)))
}
