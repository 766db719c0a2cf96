use serde::Deserialize;

/// Request body for adding a product to favorites. The id is optional at
/// the wire level so a missing field surfaces as a field error, not a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    #[serde(default)]
    pub product_id: Option<i64>,
}
