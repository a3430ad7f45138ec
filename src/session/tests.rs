//! Session manager tests against an in-memory provider.

#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::ProviderError;
use crate::provider::{
    AuthenticationResult, CodeDeliveryDetails, GetUserOutput, ResendConfirmationCodeOutput,
};
use async_trait::async_trait;
use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::Mutex;

const CODE: &str = "123456";

struct User {
    password: String,
    email: String,
    sub: String,
    confirmed: bool,
}

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    tokens: HashMap<String, String>,
    calls: Vec<&'static str>,
    resends: usize,
}

/// Provider double that follows the Cognito state machine.
#[derive(Default)]
struct InMemoryProvider {
    state: Mutex<State>,
    omit_username: bool,
    omit_sub: bool,
    challenge: bool,
    empty_token: bool,
    fail_sign_out: bool,
}

fn service(code: &str) -> ProviderError {
    ProviderError::Service {
        status: 400,
        code: code.to_string(),
        message: String::new(),
    }
}

impl InMemoryProvider {
    fn with_confirmed_user(self, username: &str, password: &str) -> Self {
        self.state.lock().unwrap().users.insert(
            username.to_string(),
            User {
                password: password.to_string(),
                email: format!("{username}@example.com"),
                sub: format!("sub-{username}"),
                confirmed: true,
            },
        );
        self
    }

    fn with_token(self, token: &str, username: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert(token.to_string(), username.to_string());
        self
    }

    fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    fn is_confirmed(&self, username: &str) -> Option<bool> {
        self.state
            .lock()
            .unwrap()
            .users
            .get(username)
            .map(|user| user.confirmed)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryProvider {
    async fn initiate_auth(
        &self,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<InitiateAuthOutput, ProviderError> {
        assert_eq!(client_id, "client-id");
        let mut state = self.state.lock().unwrap();
        state.calls.push("initiate_auth");

        let user = state
            .users
            .get(username)
            .ok_or_else(|| service("UserNotFoundException"))?;
        if user.password != password {
            return Err(service("NotAuthorizedException"));
        }
        if !user.confirmed {
            return Err(service("UserNotConfirmedException"));
        }
        if self.challenge {
            return Ok(InitiateAuthOutput {
                challenge_name: Some("NEW_PASSWORD_REQUIRED".to_string()),
                session: Some("challenge-session".to_string()),
                ..InitiateAuthOutput::default()
            });
        }

        let token = if self.empty_token {
            String::new()
        } else {
            format!("token-{username}-{}", state.tokens.len())
        };
        state.tokens.insert(token.clone(), username.to_string());

        Ok(InitiateAuthOutput {
            authentication_result: Some(AuthenticationResult {
                access_token: Some(token),
                expires_in: Some(3600),
                token_type: Some("Bearer".to_string()),
                ..AuthenticationResult::default()
            }),
            ..InitiateAuthOutput::default()
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<GetUserOutput, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("get_user");

        let username = state
            .tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| service("NotAuthorizedException"))?;
        let user = state
            .users
            .get(&username)
            .ok_or_else(|| service("UserNotFoundException"))?;

        let mut attributes = vec![AttributeType::new("email", &user.email)];
        if !self.omit_sub {
            attributes.push(AttributeType::new(SUBJECT_ATTRIBUTE, &user.sub));
        }

        Ok(GetUserOutput {
            username: (!self.omit_username).then_some(username),
            user_attributes: attributes,
        })
    }

    async fn global_sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("global_sign_out");

        if self.fail_sign_out {
            return Err(service("NotAuthorizedException"));
        }
        let username = state
            .tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| service("NotAuthorizedException"))?;
        state.tokens.retain(|_, owner| *owner != username);
        Ok(())
    }

    async fn sign_up(
        &self,
        _client_id: &str,
        username: &str,
        password: &str,
        attributes: &[AttributeType],
    ) -> Result<SignUpOutput, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("sign_up");

        if state.users.contains_key(username) {
            return Err(service("UsernameExistsException"));
        }
        assert_eq!(attributes.len(), 1);
        let email = attributes[0].value.clone().unwrap_or_default();
        let sub = format!("sub-{username}");
        state.users.insert(
            username.to_string(),
            User {
                password: password.to_string(),
                email: email.clone(),
                sub: sub.clone(),
                confirmed: false,
            },
        );

        Ok(SignUpOutput {
            user_confirmed: false,
            user_sub: Some(sub),
            code_delivery_details: Some(CodeDeliveryDetails {
                attribute_name: Some("email".to_string()),
                delivery_medium: Some("EMAIL".to_string()),
                destination: Some(email),
            }),
        })
    }

    async fn confirm_sign_up(
        &self,
        _client_id: &str,
        username: &str,
        confirmation_code: &str,
    ) -> Result<ConfirmSignUpOutput, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("confirm_sign_up");

        let user = state
            .users
            .get_mut(username)
            .ok_or_else(|| service("UserNotFoundException"))?;
        if confirmation_code != CODE {
            return Err(service("CodeMismatchException"));
        }
        user.confirmed = true;
        Ok(ConfirmSignUpOutput::default())
    }

    async fn resend_confirmation_code(
        &self,
        _client_id: &str,
        username: &str,
    ) -> Result<ResendConfirmationCodeOutput, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("resend_confirmation_code");

        if !state.users.contains_key(username) {
            return Err(service("UserNotFoundException"));
        }
        state.resends += 1;
        Ok(ResendConfirmationCodeOutput {
            code_delivery_details: Some(CodeDeliveryDetails {
                delivery_medium: Some("EMAIL".to_string()),
                ..CodeDeliveryDetails::default()
            }),
        })
    }
}

fn config() -> ProviderConfig {
    ProviderConfig::new(
        Some("us-east-1".to_string()),
        Some("client-id".to_string()),
        Some("AKIDEXAMPLE".to_string()),
        Some(SecretString::from("secret".to_string())),
    )
    .unwrap()
}

fn manager(provider: InMemoryProvider) -> (SessionManager, Arc<InMemoryProvider>) {
    let provider = Arc::new(provider);
    let manager = SessionManager::with_provider(config(), provider.clone());
    (manager, provider)
}

fn request_with_cookie(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("cognito_session={token}")).unwrap(),
    );
    headers
}

fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[test]
fn construction_builds_cognito_client_without_network() {
    let manager = SessionManager::new(config().with_endpoint("http://127.0.0.1:1/".to_string()));
    assert!(manager.is_ok());
}

#[test]
fn construction_from_env_names_missing_value() {
    temp_env::with_vars(
        [
            ("COGNITO_REGION", Some("us-east-1")),
            ("COGNITO_CLIENT_ID", Some("client-id")),
            ("COGNITO_ACCESS_KEY_ID", None),
            ("COGNITO_SECRET_ACCESS_KEY", Some("secret")),
        ],
        || {
            assert!(matches!(
                SessionManager::from_env(),
                Err(Error::Configuration("access key id"))
            ));
        },
    );
}

#[tokio::test]
async fn initiate_auth_rejects_empty_credentials_without_provider_call() {
    let (manager, provider) = manager(InMemoryProvider::default());
    let mut response = HeaderMap::new();

    let empty_username = manager.initiate_auth("", "pw", &mut response).await;
    let empty_password = manager.initiate_auth("alice", "", &mut response).await;

    assert!(matches!(
        empty_username,
        Err(Error::Validation { field: "username", .. })
    ));
    assert!(matches!(
        empty_password,
        Err(Error::Validation { field: "password", .. })
    ));
    assert!(provider.calls().is_empty());
    assert!(response.is_empty());
}

#[tokio::test]
async fn initiate_auth_writes_one_session_cookie() {
    let (manager, provider) =
        manager(InMemoryProvider::default().with_confirmed_user("alice", "pw"));
    let mut response = HeaderMap::new();

    let output = manager
        .initiate_auth("alice", "pw", &mut response)
        .await
        .unwrap();

    let token = output.access_token().map(|(token, _)| token.to_string()).unwrap();
    assert_eq!(
        set_cookies(&response),
        vec![format!("cognito_session={token}; HttpOnly; Path=/; Max-Age=3600")]
    );
    assert_eq!(provider.calls(), vec!["initiate_auth"]);
}

#[tokio::test]
async fn initiate_auth_failure_propagates_and_writes_nothing() {
    let (manager, provider) =
        manager(InMemoryProvider::default().with_confirmed_user("alice", "pw"));
    let mut response = HeaderMap::new();

    let result = manager.initiate_auth("alice", "wrong", &mut response).await;

    assert!(matches!(
        result,
        Err(ref err) if err.provider_code() == Some("NotAuthorizedException")
    ));
    assert!(response.is_empty());
    assert_eq!(provider.calls(), vec!["initiate_auth"]);
}

#[tokio::test]
async fn initiate_auth_challenge_writes_nothing() {
    let provider = InMemoryProvider {
        challenge: true,
        ..InMemoryProvider::default()
    }
    .with_confirmed_user("alice", "pw");
    let (manager, _provider) = manager(provider);
    let mut response = HeaderMap::new();

    let output = manager
        .initiate_auth("alice", "pw", &mut response)
        .await
        .unwrap();

    assert_eq!(output.challenge_name.as_deref(), Some("NEW_PASSWORD_REQUIRED"));
    assert!(response.is_empty());
}

#[tokio::test]
async fn blank_password_is_left_to_the_provider() {
    let (manager, provider) =
        manager(InMemoryProvider::default().with_confirmed_user("alice", "pw"));
    let mut response = HeaderMap::new();

    let result = manager.initiate_auth("alice", "   ", &mut response).await;

    assert!(matches!(
        result,
        Err(Error::Authentication(ref err)) if err.code() == Some("NotAuthorizedException")
    ));
    assert_eq!(provider.calls(), vec!["initiate_auth"]);
    assert!(response.is_empty());
}

#[tokio::test]
async fn empty_access_token_writes_nothing() {
    let provider = InMemoryProvider {
        empty_token: true,
        ..InMemoryProvider::default()
    }
    .with_confirmed_user("alice", "pw");
    let (manager, _provider) = manager(provider);
    let mut response = HeaderMap::new();
    let mut storage = ClientStorage::new();
    storage.insert("cognito_session", "previous");

    let output = manager
        .initiate_auth("alice", "pw", &mut response)
        .await
        .unwrap();
    manager
        .initiate_auth("alice", "pw", &mut storage)
        .await
        .unwrap();

    assert_eq!(output.access_token(), None);
    assert!(response.is_empty());
    assert_eq!(
        storage.session_token("cognito_session").as_deref(),
        Some("previous")
    );
}

#[tokio::test]
async fn second_sign_in_replaces_session_in_client_storage() {
    let (manager, _provider) =
        manager(InMemoryProvider::default().with_confirmed_user("alice", "pw"));
    let mut storage = ClientStorage::new();

    let first = manager.initiate_auth("alice", "pw", &mut storage).await.unwrap();
    let second = manager.initiate_auth("alice", "pw", &mut storage).await.unwrap();

    let first = first.access_token().map(|(t, _)| t.to_string());
    let second = second.access_token().map(|(t, _)| t.to_string());
    assert_ne!(first, second);
    assert_eq!(storage.session_token("cognito_session"), second);
}

#[tokio::test]
async fn get_server_side_user_without_cookie_is_session_error() {
    let (manager, provider) = manager(InMemoryProvider::default());

    let result = manager.get_server_side_user(&HeaderMap::new()).await;

    assert!(matches!(result, Err(Error::Session)));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn get_server_side_user_is_lenient() {
    let provider = InMemoryProvider {
        omit_username: true,
        omit_sub: true,
        ..InMemoryProvider::default()
    }
    .with_confirmed_user("alice", "pw")
    .with_token("tok", "alice");
    let (manager, provider) = manager(provider);

    let identity = manager
        .get_server_side_user(&request_with_cookie("tok"))
        .await
        .unwrap();

    assert_eq!(identity, Identity::default());
    assert_eq!(provider.calls(), vec!["get_user"]);
}

#[tokio::test]
async fn authenticate_resolves_principal() {
    let (manager, _provider) = manager(
        InMemoryProvider::default()
            .with_confirmed_user("alice", "pw")
            .with_token("tok", "alice"),
    );

    let principal = manager.authenticate(&request_with_cookie("tok")).await.unwrap();

    assert_eq!(
        principal,
        Principal {
            username: "alice".to_string(),
            subject_id: "sub-alice".to_string(),
        }
    );
}

#[tokio::test]
async fn authenticate_without_sub_is_identity_error() {
    let provider = InMemoryProvider {
        omit_sub: true,
        ..InMemoryProvider::default()
    }
    .with_confirmed_user("alice", "pw")
    .with_token("tok", "alice");
    let (manager, _provider) = manager(provider);

    let result = manager.authenticate(&request_with_cookie("tok")).await;

    assert!(matches!(result, Err(Error::Identity("sub"))));
}

#[tokio::test]
async fn authenticate_without_username_is_identity_error() {
    let provider = InMemoryProvider {
        omit_username: true,
        ..InMemoryProvider::default()
    }
    .with_confirmed_user("alice", "pw")
    .with_token("tok", "alice");
    let (manager, _provider) = manager(provider);

    let result = manager.authenticate(&request_with_cookie("tok")).await;

    assert!(matches!(result, Err(Error::Identity("username"))));
}

#[tokio::test]
async fn authenticate_does_not_cache() {
    let (manager, provider) = manager(
        InMemoryProvider::default()
            .with_confirmed_user("alice", "pw")
            .with_token("tok", "alice"),
    );
    let request = request_with_cookie("tok");

    manager.authenticate(&request).await.unwrap();
    manager.authenticate(&request).await.unwrap();

    assert_eq!(provider.calls(), vec!["get_user", "get_user"]);
}

#[tokio::test]
async fn sign_out_clears_cookie_after_provider_success() {
    let (manager, provider) = manager(
        InMemoryProvider::default()
            .with_confirmed_user("alice", "pw")
            .with_token("tok", "alice"),
    );
    let request = request_with_cookie("tok");
    let mut response = HeaderMap::new();

    manager.sign_out(&request, &mut response).await.unwrap();

    assert_eq!(
        set_cookies(&response),
        vec!["cognito_session=; HttpOnly; Path=/; Max-Age=0".to_string()]
    );
    // The revoked token no longer resolves.
    assert!(manager.get_server_side_user(&request).await.is_err());
    assert_eq!(provider.calls(), vec!["global_sign_out", "get_user"]);
}

#[tokio::test]
async fn failed_sign_out_keeps_session() {
    let provider = InMemoryProvider {
        fail_sign_out: true,
        ..InMemoryProvider::default()
    }
    .with_confirmed_user("alice", "pw");
    let (manager, _provider) = manager(provider);

    let mut storage = ClientStorage::new();
    storage.insert("cognito_session", "tok");
    let request = storage.clone();

    let result = manager.sign_out(&request, &mut storage).await;

    assert!(matches!(result, Err(Error::Authentication(_))));
    assert_eq!(storage.session_token("cognito_session"), Some("tok".to_string()));
}

#[tokio::test]
async fn sign_out_without_token_is_session_error() {
    let (manager, provider) = manager(InMemoryProvider::default());
    let mut response = HeaderMap::new();

    let result = manager.sign_out(&HeaderMap::new(), &mut response).await;

    assert!(matches!(result, Err(Error::Session)));
    assert!(provider.calls().is_empty());
    assert!(response.is_empty());
}

#[tokio::test]
async fn sign_up_validates_every_field() {
    let (manager, provider) = manager(InMemoryProvider::default());

    for (username, password, email, field) in [
        ("", "pw", "a@example.com", "username"),
        ("alice", "", "a@example.com", "password"),
        ("alice", "pw", "", "email"),
    ] {
        let result = manager.sign_up(username, password, email).await;
        assert!(
            matches!(result, Err(Error::Validation { field: f, .. }) if f == field),
            "expected validation error on {field}"
        );
    }
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn sign_up_leaves_email_format_to_the_provider() {
    let (manager, provider) = manager(InMemoryProvider::default());

    let output = manager.sign_up("bob", "pw", "bob@localhost").await.unwrap();

    assert_eq!(output.user_sub.as_deref(), Some("sub-bob"));
    assert_eq!(provider.calls(), vec!["sign_up"]);
}

#[tokio::test]
async fn sign_up_confirm_then_sign_in() {
    let (manager, provider) = manager(InMemoryProvider::default());
    let mut response = HeaderMap::new();

    let registered = manager
        .sign_up("alice", "pw", "alice@example.com")
        .await
        .unwrap();
    assert!(!registered.user_confirmed);
    assert_eq!(provider.is_confirmed("alice"), Some(false));

    // Unconfirmed users cannot sign in yet.
    let pending = manager.initiate_auth("alice", "pw", &mut response).await;
    assert!(matches!(
        pending,
        Err(ref err) if err.provider_code() == Some("UserNotConfirmedException")
    ));
    assert!(response.is_empty());

    let mismatch = manager.confirm_sign_up("alice", "000000").await;
    assert!(matches!(
        mismatch,
        Err(ref err) if err.provider_code() == Some("CodeMismatchException")
    ));
    assert_eq!(provider.is_confirmed("alice"), Some(false));

    manager.confirm_sign_up("alice", CODE).await.unwrap();
    assert_eq!(provider.is_confirmed("alice"), Some(true));

    manager
        .initiate_auth("alice", "pw", &mut response)
        .await
        .unwrap();
    assert_eq!(set_cookies(&response).len(), 1);
}

#[tokio::test]
async fn confirm_sign_up_validates_inputs() {
    let (manager, provider) = manager(InMemoryProvider::default());

    assert!(matches!(
        manager.confirm_sign_up("", CODE).await,
        Err(Error::Validation { field: "username", .. })
    ));
    assert!(matches!(
        manager.confirm_sign_up("alice", "").await,
        Err(Error::Validation { field: "confirmation code", .. })
    ));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn resend_confirmation_code_validates_username() {
    let (manager, provider) = manager(InMemoryProvider::default());

    let result = manager.resend_confirmation_code("  ").await;

    assert!(matches!(
        result,
        Err(Error::Validation { field: "username", .. })
    ));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn resend_confirmation_code_forwards_each_call() {
    let (manager, provider) = manager(InMemoryProvider::default());
    manager
        .sign_up("alice", "pw", "alice@example.com")
        .await
        .unwrap();

    manager.resend_confirmation_code("alice").await.unwrap();
    let output = manager.resend_confirmation_code("alice").await.unwrap();

    assert_eq!(
        output
            .code_delivery_details
            .and_then(|details| details.delivery_medium),
        Some("EMAIL".to_string())
    );
    assert_eq!(provider.state.lock().unwrap().resends, 2);
    assert_eq!(provider.is_confirmed("alice"), Some(false));
}
