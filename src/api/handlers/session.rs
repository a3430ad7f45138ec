//! Session endpoints: sign-in, sign-out and identity lookups.

use super::{
    types::{ErrorResponse, MeResponse, SessionResponse, SignInRequest, SignInResponse},
    ApiError,
};
use crate::{error::Error, session::SessionManager};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/v1/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in, or a challenge is pending", body = SignInResponse),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "User not confirmed", body = ErrorResponse),
        (status = 429, description = "Throttled by the identity provider", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all, fields(username = %request.username))]
pub async fn signin(
    manager: Extension<SessionManager>,
    Json(request): Json<SignInRequest>,
) -> Result<Response, ApiError> {
    let mut headers = HeaderMap::new();

    let output = manager
        .initiate_auth(&request.username, &request.password, &mut headers)
        .await?;

    Ok((StatusCode::OK, headers, Json(SignInResponse::from(&output))).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/auth/signout",
    responses(
        (status = 204, description = "Session revoked and cookie cleared"),
        (status = 401, description = "No session, or the provider rejected the token", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn signout(
    headers: HeaderMap,
    manager: Extension<SessionManager>,
) -> Result<Response, ApiError> {
    let mut response_headers = HeaderMap::new();

    manager.sign_out(&headers, &mut response_headers).await?;

    Ok((StatusCode::NO_CONTENT, response_headers).into_response())
}

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn session(
    headers: HeaderMap,
    manager: Extension<SessionManager>,
) -> Result<Response, ApiError> {
    match manager.get_server_side_user(&headers).await {
        Ok(identity) => Ok((StatusCode::OK, Json(SessionResponse::from(identity))).into_response()),
        // Missing cookies are treated as "no session".
        Err(Error::Session) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    get,
    path = "/v1/me",
    responses(
        (status = 200, description = "Authenticated user", body = MeResponse),
        (status = 401, description = "Missing or unverifiable session", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn me(
    headers: HeaderMap,
    manager: Extension<SessionManager>,
) -> Result<Json<MeResponse>, ApiError> {
    let principal = manager.authenticate(&headers).await?;
    Ok(Json(MeResponse::from(principal)))
}
