use super::{
    AttributeType, AuthenticationResult, CodeDeliveryDetails, ConfirmSignUpOutput, GetUserOutput,
    IdentityProvider, InitiateAuthOutput, ResendConfirmationCodeOutput, SignUpOutput,
};
use crate::{
    config::ProviderConfig,
    error::{Error, ProviderError, Result},
};
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_cognitoidentityprovider::{
    config::{
        http::HttpResponse, retry::RetryConfig, AppName, Builder as CognitoConfigBuilder,
        IdentityCache, Region, StalledStreamProtectionConfig,
    },
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::{self as cognito, AuthFlowType},
    Client,
};
use secrecy::ExposeSecret;
use std::future::Future;
use tracing::{debug, info_span, Instrument};
use url::Url;

/// Cognito user pool client built on the AWS SDK with the configured key pair.
#[derive(Clone)]
pub struct CognitoClient {
    client: Client,
    endpoint: Url,
}

impl std::fmt::Debug for CognitoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CognitoClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// Service failures keep the provider's status, error code and message.
fn provider_error<E>(err: SdkError<E, HttpResponse>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match err {
        SdkError::ServiceError(context) => {
            let status = context.raw().status().as_u16();
            let err = context.into_err();
            ProviderError::Service {
                status,
                code: err.code().unwrap_or("UnknownError").to_string(),
                message: err.message().unwrap_or_default().to_string(),
            }
        }
        other => ProviderError::Transport(DisplayErrorContext(&other).to_string()),
    }
}

fn code_delivery(details: &cognito::CodeDeliveryDetailsType) -> CodeDeliveryDetails {
    CodeDeliveryDetails {
        attribute_name: details.attribute_name().map(ToOwned::to_owned),
        delivery_medium: details.delivery_medium().map(|m| m.as_str().to_string()),
        destination: details.destination().map(ToOwned::to_owned),
    }
}

impl CognitoClient {
    /// Build a client for the configured region or endpoint override.
    /// No request is sent.
    ///
    /// # Errors
    /// Returns `Error::Endpoint` if the endpoint cannot be parsed.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let raw = config.endpoint();
        let endpoint = Url::parse(&raw).map_err(|e| Error::Endpoint(format!("{raw}: {e}")))?;
        if endpoint.host_str().is_none() {
            return Err(Error::Endpoint(format!("{raw}: no host specified")));
        }

        let credentials = Credentials::new(
            config.credentials().access_key_id(),
            config.credentials().secret_access_key().expose_secret(),
            None,
            None,
            "cognito-session-static",
        );

        // Failures surface to the caller as-is; the SDK must not retry them.
        let mut builder = CognitoConfigBuilder::new()
            .region(Region::new(config.region().to_string()))
            .endpoint_url(endpoint.as_str())
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
            .identity_cache(IdentityCache::no_cache());
        builder.set_app_name(AppName::new(env!("CARGO_PKG_NAME")).ok());

        Ok(Self {
            client: Client::from_conf(builder.build()),
            endpoint,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send<T, E, F>(&self, operation: &'static str, request: F) -> Result<T, ProviderError>
    where
        F: Future<Output = std::result::Result<T, SdkError<E, HttpResponse>>> + Send,
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        let span = info_span!(
            "cognito.request",
            operation,
            url = %self.endpoint
        );

        request.instrument(span).await.map_err(|err| {
            let err = provider_error(err);
            debug!("{operation} failed: {err}");
            err
        })
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn initiate_auth(
        &self,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<InitiateAuthOutput, ProviderError> {
        let request = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(client_id)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password)
            .send();
        let output = self.send("InitiateAuth", request).await?;

        Ok(InitiateAuthOutput {
            authentication_result: output.authentication_result().map(|result| {
                AuthenticationResult {
                    access_token: result.access_token().map(ToOwned::to_owned),
                    expires_in: Some(i64::from(result.expires_in())),
                    id_token: result.id_token().map(ToOwned::to_owned),
                    refresh_token: result.refresh_token().map(ToOwned::to_owned),
                    token_type: result.token_type().map(ToOwned::to_owned),
                }
            }),
            challenge_name: output.challenge_name().map(|c| c.as_str().to_string()),
            session: output.session().map(ToOwned::to_owned),
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<GetUserOutput, ProviderError> {
        let request = self.client.get_user().access_token(access_token).send();
        let output = self.send("GetUser", request).await?;

        Ok(GetUserOutput {
            username: Some(output.username().to_string()).filter(|u| !u.is_empty()),
            user_attributes: output
                .user_attributes()
                .iter()
                .map(|attribute| AttributeType {
                    name: attribute.name().to_string(),
                    value: attribute.value().map(ToOwned::to_owned),
                })
                .collect(),
        })
    }

    async fn global_sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let request = self.client.global_sign_out().access_token(access_token).send();
        self.send("GlobalSignOut", request).await?;
        Ok(())
    }

    async fn sign_up(
        &self,
        client_id: &str,
        username: &str,
        password: &str,
        attributes: &[AttributeType],
    ) -> Result<SignUpOutput, ProviderError> {
        let attributes = attributes
            .iter()
            .map(|attribute| {
                cognito::AttributeType::builder()
                    .name(&attribute.name)
                    .set_value(attribute.value.clone())
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let request = self
            .client
            .sign_up()
            .client_id(client_id)
            .username(username)
            .password(password)
            .set_user_attributes(Some(attributes))
            .send();
        let output = self.send("SignUp", request).await?;

        Ok(SignUpOutput {
            user_confirmed: output.user_confirmed(),
            user_sub: Some(output.user_sub().to_string()).filter(|s| !s.is_empty()),
            code_delivery_details: output.code_delivery_details().map(code_delivery),
        })
    }

    async fn confirm_sign_up(
        &self,
        client_id: &str,
        username: &str,
        confirmation_code: &str,
    ) -> Result<ConfirmSignUpOutput, ProviderError> {
        let request = self
            .client
            .confirm_sign_up()
            .client_id(client_id)
            .username(username)
            .confirmation_code(confirmation_code)
            .send();
        let output = self.send("ConfirmSignUp", request).await?;

        Ok(ConfirmSignUpOutput {
            session: output.session().map(ToOwned::to_owned),
        })
    }

    async fn resend_confirmation_code(
        &self,
        client_id: &str,
        username: &str,
    ) -> Result<ResendConfirmationCodeOutput, ProviderError> {
        let request = self
            .client
            .resend_confirmation_code()
            .client_id(client_id)
            .username(username)
            .send();
        let output = self.send("ResendConfirmationCode", request).await?;

        Ok(ResendConfirmationCodeOutput {
            code_delivery_details: output.code_delivery_details().map(code_delivery),
        })
    }
}
