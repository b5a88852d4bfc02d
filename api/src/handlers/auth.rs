use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::AuthenticatedUser,
    models::user::{AuthResponse, LoginRequest, MeResponse, RegisterRequest, UserInfo},
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let summary = state
        .auth
        .register(&payload.email, &payload.username, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(summary, "Account created")),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let summary = state.auth.login(&payload.email, &payload.password).await?;

    Ok(Json(AuthResponse::new(summary, "Login successful")))
}

/// Echoes the identity resolved from the bearer token.
pub async fn me(Extension(user): Extension<AuthenticatedUser>) -> Json<MeResponse> {
    let AuthenticatedUser(claims) = user;
    Json(MeResponse {
        success: true,
        user: UserInfo {
            email: claims.sub,
            username: claims.identity.username,
        },
    })
}
