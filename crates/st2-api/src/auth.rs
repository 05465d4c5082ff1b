//! Credential state and header assembly

use crate::errors::Result;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONNECTION, CONTENT_TYPE,
};
use st2_core::St2Error;

/// Header carrying a static API key (`St2-Api-Key`)
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("st2-api-key");
/// Header carrying a bearer token obtained from the auth service (`X-Auth-Token`)
pub const AUTH_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-auth-token");

/// Which credential is sent with requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    None,
    ApiKey,
    Token,
}

/// Stored credentials.
///
/// Both values may be present at once (a key check on a client that already
/// holds a token); the API key wins when building headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
}

impl Credentials {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            auth_token: None,
        }
    }

    pub fn with_auth_token(auth_token: impl Into<String>) -> Self {
        Self {
            api_key: None,
            auth_token: Some(auth_token.into()),
        }
    }

    pub fn mode(&self) -> CredentialMode {
        if self.api_key.is_some() {
            CredentialMode::ApiKey
        } else if self.auth_token.is_some() {
            CredentialMode::Token
        } else {
            CredentialMode::None
        }
    }

    /// The single credential header to send, if any
    pub fn header(&self) -> Option<(HeaderName, &str)> {
        match (&self.api_key, &self.auth_token) {
            (Some(key), _) => Some((API_KEY_HEADER, key)),
            (None, Some(token)) => Some((AUTH_TOKEN_HEADER, token)),
            (None, None) => None,
        }
    }

    /// Apply the credential header to a request
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) -> Result<()> {
        if let Some((name, value)) = self.header() {
            let value = HeaderValue::from_str(value).map_err(|_| {
                St2Error::InvalidInput(format!("{} contains invalid header characters", name))
            })?;
            headers.insert(name, value);
        }
        Ok(())
    }
}

/// Headers sent with every request, plus `Content-Type` for write verbs
pub fn base_headers(write: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if write {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    headers
}

/// Mask a secret for logging, keeping the first and last four characters
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_header() {
        let creds = Credentials::with_api_key("key-123");
        let mut headers = HeaderMap::new();
        creds.apply_to_headers(&mut headers).unwrap();

        assert_eq!(headers.get("st2-api-key").unwrap(), "key-123");
        assert!(headers.get("x-auth-token").is_none());
        assert_eq!(creds.mode(), CredentialMode::ApiKey);
    }

    #[test]
    fn test_token_header() {
        let creds = Credentials::with_auth_token("tok");
        let mut headers = HeaderMap::new();
        creds.apply_to_headers(&mut headers).unwrap();

        assert_eq!(headers.get("x-auth-token").unwrap(), "tok");
        assert!(headers.get("st2-api-key").is_none());
        assert_eq!(creds.mode(), CredentialMode::Token);
    }

    #[test]
    fn test_api_key_takes_precedence() {
        let creds = Credentials {
            api_key: Some("key".to_string()),
            auth_token: Some("tok".to_string()),
        };
        let mut headers = HeaderMap::new();
        creds.apply_to_headers(&mut headers).unwrap();

        assert_eq!(headers.get("st2-api-key").unwrap(), "key");
        assert!(headers.get("x-auth-token").is_none());
    }

    #[test]
    fn test_no_credentials() {
        let creds = Credentials::default();
        let mut headers = HeaderMap::new();
        creds.apply_to_headers(&mut headers).unwrap();

        assert!(headers.is_empty());
        assert_eq!(creds.mode(), CredentialMode::None);
    }

    #[test]
    fn test_invalid_header_value() {
        let creds = Credentials::with_api_key("bad\nkey");
        let mut headers = HeaderMap::new();
        assert!(creds.apply_to_headers(&mut headers).is_err());
    }

    #[test]
    fn test_base_headers() {
        let read = base_headers(false);
        assert_eq!(read.get("connection").unwrap(), "keep-alive");
        assert_eq!(read.get("accept-encoding").unwrap(), "gzip, deflate");
        assert_eq!(read.get("accept").unwrap(), "application/json");
        assert!(read.get("content-type").is_none());

        let write = base_headers(true);
        assert_eq!(write.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcd1234wxyz"), "abcd...wxyz");
        assert_eq!(mask_secret("short"), "*****");
    }
}
