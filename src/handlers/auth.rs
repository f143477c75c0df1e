use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::StorefrontStore;
use crate::errors::AppError;
use crate::AppState;

use super::session_token;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: Uuid,
    pub user_id: Uuid,
}

/// POST /auth/register
///
/// Creates a user and opens a session for it in one step.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User registered and logged in", body = SessionResponse),
        (status = 409, description = "Email already registered"),
    ),
    tag = "auth"
)]
pub async fn register<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    body: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::InvalidInput(
            "email and password must be non-empty".to_string(),
        ));
    }

    let store = state.store.clone();
    let user_id = web::block(move || store.register(&body.email, &body.password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let token = state.sessions.open(user_id);
    log::info!("registered user {user_id}");
    Ok(HttpResponse::Created().json(SessionResponse { token, user_id }))
}

/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 401, description = "Invalid email or password"),
    ),
    tag = "auth"
)]
pub async fn login<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    body: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let store = state.store.clone();
    let user_id = web::block(move || store.verify_credentials(&body.email, &body.password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let token = state.sessions.open(user_id);
    Ok(HttpResponse::Ok().json(SessionResponse { token, user_id }))
}

/// POST /auth/logout
///
/// Discards the session (and with it the in-memory cart). Idempotent.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Session discarded")),
    tag = "auth"
)]
pub async fn logout<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    if let Some(token) = session_token(&req) {
        state.sessions.close(token);
    }
    Ok(HttpResponse::NoContent().finish())
}
