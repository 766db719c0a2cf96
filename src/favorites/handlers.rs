use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::token::AuthUser,
    error::ApiError,
    extract::ValidJson,
    favorites::{dto::AddFavoriteRequest, repo::PgFavoriteStore, service},
    products::repo::Product,
    state::AppState,
};

pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/favorite/", get(list_favorites).post(add_favorite))
        .route("/favorite/:id/", delete(remove_favorite))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    let store = PgFavoriteStore { db: state.db.clone() };
    let products = service::list_favorites(&store, &user).await?;
    Ok(Json(products))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let store = PgFavoriteStore { db: state.db.clone() };
    let product = service::add_favorite(&store, &user, payload.product_id).await?;
    info!(user_id = %user.id, product_id = %product.id, "favorite added");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let store = PgFavoriteStore { db: state.db.clone() };
    service::remove_favorite(&store, &user, id).await?;
    info!(user_id = %user.id, product_id = %id, "favorite removed");
    Ok(StatusCode::NO_CONTENT)
}
