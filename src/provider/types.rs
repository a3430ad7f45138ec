//! Provider results as seen by the session manager.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeType {
    pub name: String,
    pub value: Option<String>,
}

impl AttributeType {
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthenticationResult {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitiateAuthOutput {
    pub authentication_result: Option<AuthenticationResult>,
    pub challenge_name: Option<String>,
    pub session: Option<String>,
}

impl InitiateAuthOutput {
    /// Access token and its lifetime in seconds, if the provider issued one.
    ///
    /// An empty token counts as no token, and a non-positive lifetime as unknown.
    #[must_use]
    pub fn access_token(&self) -> Option<(&str, Option<i64>)> {
        let result = self.authentication_result.as_ref()?;
        let token = result.access_token.as_deref().filter(|t| !t.is_empty())?;
        Some((token, result.expires_in.filter(|secs| *secs > 0)))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetUserOutput {
    pub username: Option<String>,
    pub user_attributes: Vec<AttributeType>,
}

impl GetUserOutput {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.user_attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .and_then(|attribute| attribute.value.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeDeliveryDetails {
    pub attribute_name: Option<String>,
    pub delivery_medium: Option<String>,
    pub destination: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignUpOutput {
    pub user_confirmed: bool,
    pub user_sub: Option<String>,
    pub code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfirmSignUpOutput {
    pub session: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResendConfirmationCodeOutput {
    pub code_delivery_details: Option<CodeDeliveryDetails>,
}
