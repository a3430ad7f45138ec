//! Request and response bodies for the session endpoints.

use crate::{
    provider::{CodeDeliveryDetails, InitiateAuthOutput, ResendConfirmationCodeOutput, SignUpOutput},
    session::{Identity, Principal},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Missing fields deserialize as empty strings so validation reports them by name.

#[derive(ToSchema, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SignInResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
}

impl From<&InitiateAuthOutput> for SignInResponse {
    fn from(output: &InitiateAuthOutput) -> Self {
        let token = output.access_token();
        Self {
            authenticated: token.is_some(),
            expires_in: token.and_then(|(_, expires_in)| expires_in),
            challenge_name: output.challenge_name.clone(),
        }
    }
}

#[derive(ToSchema, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .field("email", &self.email)
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CodeDelivery {
    pub attribute_name: Option<String>,
    pub delivery_medium: Option<String>,
    pub destination: Option<String>,
}

impl From<CodeDeliveryDetails> for CodeDelivery {
    fn from(details: CodeDeliveryDetails) -> Self {
        Self {
            attribute_name: details.attribute_name,
            delivery_medium: details.delivery_medium,
            destination: details.destination,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SignUpResponse {
    pub user_confirmed: bool,
    pub user_sub: Option<String>,
    pub code_delivery: Option<CodeDelivery>,
}

impl From<SignUpOutput> for SignUpResponse {
    fn from(output: SignUpOutput) -> Self {
        Self {
            user_confirmed: output.user_confirmed,
            user_sub: output.user_sub,
            code_delivery: output.code_delivery_details.map(CodeDelivery::from),
        }
    }
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub code: String,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct ResendRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ResendResponse {
    pub code_delivery: Option<CodeDelivery>,
}

impl From<ResendConfirmationCodeOutput> for ResendResponse {
    fn from(output: ResendConfirmationCodeOutput) -> Self {
        Self {
            code_delivery: output.code_delivery_details.map(CodeDelivery::from),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SessionResponse {
    pub username: Option<String>,
    pub subject_id: Option<String>,
}

impl From<Identity> for SessionResponse {
    fn from(identity: Identity) -> Self {
        Self {
            username: identity.username,
            subject_id: identity.subject_id,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MeResponse {
    pub username: String,
    pub subject_id: String,
}

impl From<Principal> for MeResponse {
    fn from(principal: Principal) -> Self {
        Self {
            username: principal.username,
            subject_id: principal.subject_id,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
