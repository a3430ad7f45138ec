use crate::{error::Error, provider::GetUserOutput};
use serde::Serialize;

/// Provider attribute carrying the immutable user identifier.
pub const SUBJECT_ATTRIBUTE: &str = "sub";

/// Identity as reported by the provider; either field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: Option<String>,
    pub subject_id: Option<String>,
}

impl From<GetUserOutput> for Identity {
    fn from(output: GetUserOutput) -> Self {
        Self {
            subject_id: output.attribute(SUBJECT_ATTRIBUTE).map(ToString::to_string),
            username: output.username,
        }
    }
}

/// Fully resolved identity, safe for trust decisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub subject_id: String,
}

impl TryFrom<Identity> for Principal {
    type Error = Error;

    fn try_from(identity: Identity) -> Result<Self, Self::Error> {
        let username = identity
            .username
            .filter(|username| !username.is_empty())
            .ok_or(Error::Identity("username"))?;
        let subject_id = identity
            .subject_id
            .filter(|subject_id| !subject_id.is_empty())
            .ok_or(Error::Identity(SUBJECT_ATTRIBUTE))?;

        Ok(Self {
            username,
            subject_id,
        })
    }
}
