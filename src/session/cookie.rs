//! Session cookie encoding.

/// One write to the session slot: issuing a token or clearing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionCookie<'a> {
    pub name: &'a str,
    pub token: &'a str,
    pub max_age: Option<i64>,
    pub secure: bool,
}

impl<'a> SessionCookie<'a> {
    #[must_use]
    pub fn issue(name: &'a str, token: &'a str, max_age: Option<i64>, secure: bool) -> Self {
        Self {
            name,
            token,
            max_age,
            secure,
        }
    }

    /// Empty value with `Max-Age=0`, same scope and flags as [`SessionCookie::issue`].
    #[must_use]
    pub fn clear(name: &'a str, secure: bool) -> Self {
        Self {
            name,
            token: "",
            max_age: Some(0),
            secure,
        }
    }

    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.token.is_empty() || self.max_age.is_some_and(|age| age <= 0)
    }

    /// `Set-Cookie` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        let mut cookie = format!("{}={}; HttpOnly; Path=/", self.name, self.token);
        if let Some(max_age) = self.max_age {
            cookie.push_str(&format!("; Max-Age={}", max_age.max(0)));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// First non-empty value of `name` in a `Cookie` request header value.
pub(crate) fn extract_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        let value = value.trim();
        (key.trim() == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Whether a `Set-Cookie` header value targets cookie `name`.
pub(crate) fn sets_cookie(header: &str, name: &str) -> bool {
    header
        .split_once('=')
        .is_some_and(|(key, _)| key.trim() == name)
}
