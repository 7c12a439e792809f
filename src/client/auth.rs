use base64::Engine;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};

/// Header carrying the tenant API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Use an API key sent in the `x-api-key` header
    Apikey(String),
    /// Use username and password authentication via Basic Auth headers
    Basic(String, String),
    /// Don't send any credential
    None,
}

impl Auth {
    /// Pick an auth method from whatever credentials are available.
    ///
    /// An API key wins over username/password; a lone username or password
    /// is not enough for Basic auth.
    pub fn from_parts(
        apikey: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        match (apikey, username, password) {
            (Some(apikey), _, _) if !apikey.is_empty() => Self::Apikey(apikey),
            (_, Some(username), Some(password)) => Self::Basic(username, password),
            _ => Self::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Headers to attach to every authenticated API request.
    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        match self {
            Self::Apikey(apikey) => {
                let mut value = HeaderValue::from_str(apikey)?;
                value.set_sensitive(true);
                headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
            }
            Self::Basic(username, password) => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                let mut value = HeaderValue::from_str(&format!("Basic {}", credentials))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Self::None => {}
        }
        Ok(headers)
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apikey(_) => write!(f, "Apikey"),
            Self::Basic(_, _) => write!(f, "Basic"),
            Self::None => write!(f, "None"),
        }
    }
}

// Secrets never reach logs, even through `{:?}` on a parent struct.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apikey(_) => write!(f, "Apikey(<redacted>)"),
            Self::Basic(username, _) => write!(f, "Basic({}, <redacted>)", username),
            Self::None => write!(f, "None"),
        }
    }
}
