use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::token::AdminUser,
    error::{ApiError, FieldErrors},
    extract::ValidJson,
    products::{dto::CreateProductRequest, repo::Product},
    state::AppState,
    validation::{validate_product_name, validate_product_price},
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products/", get(list_products).post(create_product))
        .route("/products/:id", get(get_product))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = Product::list(&state.db).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Product not found."))?;
    Ok(Json(product))
}

#[instrument(skip(state, admin, payload), fields(admin_id = %admin.id))]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(payload): ValidJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let mut errors = FieldErrors::default();
    validate_product_name(&payload.name, &mut errors);
    validate_product_price(payload.price, &mut errors);
    errors.into_result()?;

    let product =
        Product::create(&state.db, &payload.name, &payload.description, payload.price).await?;

    info!(product_id = %product.id, admin_id = %admin.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}
