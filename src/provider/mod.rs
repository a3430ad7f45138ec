//! Identity provider contract and its Cognito implementation.
//!
//! The session manager only depends on [`IdentityProvider`]; [`CognitoClient`]
//! talks to a Cognito user pool through `aws-sdk-cognitoidentityprovider`.

pub mod cognito;
pub mod types;

pub use cognito::CognitoClient;
pub use types::{
    AttributeType, AuthenticationResult, CodeDeliveryDetails, ConfirmSignUpOutput, GetUserOutput,
    InitiateAuthOutput, ResendConfirmationCodeOutput, SignUpOutput,
};

use crate::error::ProviderError;
use async_trait::async_trait;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Password authentication (`USER_PASSWORD_AUTH`).
    async fn initiate_auth(
        &self,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<InitiateAuthOutput, ProviderError>;

    /// Look up the user owning `access_token`.
    async fn get_user(&self, access_token: &str) -> Result<GetUserOutput, ProviderError>;

    /// Invalidate every token issued to the user owning `access_token`.
    async fn global_sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    async fn sign_up(
        &self,
        client_id: &str,
        username: &str,
        password: &str,
        attributes: &[AttributeType],
    ) -> Result<SignUpOutput, ProviderError>;

    async fn confirm_sign_up(
        &self,
        client_id: &str,
        username: &str,
        confirmation_code: &str,
    ) -> Result<ConfirmSignUpOutput, ProviderError>;

    async fn resend_confirmation_code(
        &self,
        client_id: &str,
        username: &str,
    ) -> Result<ResendConfirmationCodeOutput, ProviderError>;
}
