use super::handlers::{health, registration, session, types};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        session::signin,
        session::signout,
        session::session,
        session::me,
        registration::signup,
        registration::confirm,
        registration::resend,
    ),
    components(schemas(
        types::SignInRequest,
        types::SignInResponse,
        types::SignUpRequest,
        types::SignUpResponse,
        types::CodeDelivery,
        types::ConfirmRequest,
        types::ResendRequest,
        types::ResendResponse,
        types::SessionResponse,
        types::MeResponse,
        types::ErrorResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Session lifecycle"),
        (name = "registration", description = "Sign-up and confirmation"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    // Use Cargo.toml metadata instead of the utoipa defaults.
    openapi.info.title = env!("CARGO_PKG_NAME").to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some(env!("CARGO_PKG_DESCRIPTION").to_string());
    openapi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = openapi();
        for path in [
            "/health",
            "/v1/auth/signin",
            "/v1/auth/signout",
            "/v1/auth/session",
            "/v1/me",
            "/v1/auth/signup",
            "/v1/auth/confirm",
            "/v1/auth/resend",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
    }
}
