use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::dto::{
    LoginRequest, LoginResponse, MessageResponse, PublicUser, SignupRequest, VerifyResponse,
};
use crate::auth::errors::AuthError;
use crate::auth::extractors::AuthClaims;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/verify", get(verify))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    state
        .auth
        .signup(&payload.name, &payload.email, &payload.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Account created successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let (access_token, user) = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        access_token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

#[instrument(skip(claims))]
pub async fn verify(AuthClaims(claims): AuthClaims) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user_id: claims.sub,
        email: claims.email,
        name: claims.name,
    })
}
