//! Registration endpoints: sign-up, confirmation and code resend.

use super::{
    types::{ConfirmRequest, ErrorResponse, ResendRequest, ResendResponse, SignUpRequest, SignUpResponse},
    ApiError,
};
use crate::session::SessionManager;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User registered, confirmation pending", body = SignUpResponse),
        (status = 400, description = "Missing or invalid input", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    ),
    tag = "registration"
)]
#[instrument(skip_all, fields(username = %request.username))]
pub async fn signup(
    manager: Extension<SessionManager>,
    Json(request): Json<SignUpRequest>,
) -> Result<Response, ApiError> {
    let output = manager
        .sign_up(&request.username, &request.password, &request.email)
        .await?;

    Ok((StatusCode::CREATED, Json(SignUpResponse::from(output))).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/auth/confirm",
    request_body = ConfirmRequest,
    responses(
        (status = 204, description = "User confirmed"),
        (status = 400, description = "Missing input or wrong code", body = ErrorResponse)
    ),
    tag = "registration"
)]
#[instrument(skip_all, fields(username = %request.username))]
pub async fn confirm(
    manager: Extension<SessionManager>,
    Json(request): Json<ConfirmRequest>,
) -> Result<StatusCode, ApiError> {
    manager
        .confirm_sign_up(&request.username, &request.code)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/v1/auth/resend",
    request_body = ResendRequest,
    responses(
        (status = 202, description = "A new confirmation code is on its way", body = ResendResponse),
        (status = 400, description = "Missing username", body = ErrorResponse)
    ),
    tag = "registration"
)]
#[instrument(skip_all, fields(username = %request.username))]
pub async fn resend(
    manager: Extension<SessionManager>,
    Json(request): Json<ResendRequest>,
) -> Result<Response, ApiError> {
    let output = manager.resend_confirmation_code(&request.username).await?;

    Ok((StatusCode::ACCEPTED, Json(ResendResponse::from(output))).into_response())
}
