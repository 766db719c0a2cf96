use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest, TokenResponse},
        password::{hash_password, verify_password},
        repo::{AuthToken, User},
        token::AuthUser,
    },
    error::{ApiError, FieldErrors},
    extract::ValidJson,
    state::AppState,
    validation::{validate_email, validate_password, validate_username},
};

const EMAIL_TAKEN: &str = "A user with this email already exists.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/logout/", post(logout))
}

fn email_taken_error() -> ApiError {
    let mut errors = FieldErrors::default();
    errors.push("email", EMAIL_TAKEN);
    ApiError::Validation(errors)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(mut payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = FieldErrors::default();
    validate_username(&payload.username, &mut errors);
    validate_email(&payload.email, &mut errors);
    validate_password(&payload.password, &mut errors);

    // Ensure email is not taken
    if !errors.contains("email") {
        if User::find_by_email(&state.db, &payload.email).await?.is_some() {
            warn!(email = %payload.email, "email already registered");
            errors.push("email", EMAIL_TAKEN);
        }
    }
    errors.into_result()?;

    let hash = hash_password(&payload.password)?;
    // A concurrent registration can win the insert after the pre-check;
    // the unique constraint reports it as the same field error.
    let user = match User::create(&state.db, &payload.username, &payload.email, &hash).await? {
        Some(user) => user,
        None => {
            warn!(email = %payload.email, "email registered concurrently");
            return Err(email_taken_error());
        }
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(mut payload): ValidJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::BadRequest(
                "User with this email does not exist.".into(),
            ));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid password."));
    }

    // A repeat login returns the existing token
    let token = AuthToken::get_or_create(&state.db, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse { token: token.key }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    AuthToken::delete_for_user(&state.db, user.id).await?;
    info!(user_id = %user.id, "user logged out");
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn duplicate_email_is_a_field_error() {
        match email_taken_error() {
            ApiError::Validation(errors) => assert!(errors.contains("email")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            email_taken_error().into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
