use tracing::warn;

use crate::{
    auth::repo::User,
    error::{ApiError, FieldErrors},
    favorites::repo::{FavoriteStore, InsertOutcome},
    products::repo::Product,
    validation::validate_favorite_product_id,
};

const ALREADY_FAVORITE: &str = "Product already in favorites.";

/// All products currently favorited by the user, in ascending id order.
pub async fn list_favorites<S: FavoriteStore>(
    store: &S,
    user: &User,
) -> Result<Vec<Product>, ApiError> {
    Ok(store.list(user.id).await?)
}

/// Add a product to the user's favorites and return it.
///
/// Validate-before-mutate: id shape and duplicate membership are checked
/// first and collected together, then the product is resolved (a miss is a
/// distinct not-found failure, not a validation one), and only then is the
/// pair inserted. A duplicate surfaced by the store at insert time is
/// reported exactly like the pre-check would have reported it.
pub async fn add_favorite<S: FavoriteStore>(
    store: &S,
    user: &User,
    product_id: Option<i64>,
) -> Result<Product, ApiError> {
    let mut errors = FieldErrors::default();
    let product_id = validate_favorite_product_id(product_id, &mut errors);

    if let Some(id) = product_id {
        if store.contains(user.id, id).await? {
            errors.push("product_id", ALREADY_FAVORITE);
        }
    }
    errors.into_result()?;
    let product_id = product_id.expect("id present when no field errors");

    let product = store
        .product(product_id)
        .await?
        .ok_or(ApiError::NotFound("Product not found."))?;

    match store.insert(user.id, product_id).await? {
        InsertOutcome::Inserted => Ok(product),
        InsertOutcome::Duplicate => {
            warn!(user_id = %user.id, %product_id, "concurrent favorite insert lost");
            let mut errors = FieldErrors::default();
            errors.push("product_id", ALREADY_FAVORITE);
            Err(ApiError::Validation(errors))
        }
    }
}

/// Remove a product from the user's favorites.
///
/// Membership in this user's favorites is the authoritative check: removing
/// a product that exists in the catalog but was never favorited fails with
/// not-found, never a silent no-op.
pub async fn remove_favorite<S: FavoriteStore>(
    store: &S,
    user: &User,
    product_id: i64,
) -> Result<(), ApiError> {
    if store.remove(user.id, product_id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Product not found in favorites."))
    }
}
