use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use rand::RngCore;

use crate::{auth::repo::User, error::ApiError, state::AppState};

const KEY_BYTES: usize = 20;

/// Generate a fresh opaque token key: 40 lowercase hex characters.
pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut key = String::with_capacity(KEY_BYTES * 2);
    for b in bytes {
        key.push_str(&format!("{:02x}", b));
    }
    key
}

/// Extracts the `Authorization: Token <key>` header and resolves it to the
/// owning user. Rejects with 401 when the header is missing, malformed or
/// the key is unknown.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthorized(
                "Authentication credentials were not provided.",
            ))?;

        // Expect "Token <key>"
        let key = auth
            .strip_prefix("Token ")
            .or_else(|| auth.strip_prefix("token "))
            .ok_or(ApiError::Unauthorized("Invalid token header."))?;

        let user = User::find_by_token(&state.db, key)
            .await?
            .ok_or(ApiError::Unauthorized("Invalid token."))?;

        Ok(AuthUser(user))
    }
}

/// Like [`AuthUser`] but additionally requires the admin flag.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::Forbidden(
                "You do not have permission to perform this action.",
            ));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_forty_hex_chars() {
        let key = generate_key();
        assert_eq!(key.len(), 40);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn keys_are_unique() {
        assert_ne!(generate_key(), generate_key());
    }
}
