use crate::auth::{base_headers, mask_secret, CredentialMode, Credentials};
use crate::errors::{ApiError, HttpError, Result};
use log::{debug, error, info, trace, warn};
use parking_lot::RwLock;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::Value;
use st2_core::{ResponseValue, St2Error};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Base URI used when none is configured
pub const DEFAULT_BASE_URI: &str = "https://localhost";
/// Path prefix when the API is reached through the main web endpoint
pub const API_PATH_PREFIX: &str = "/api/v1";
/// Path prefix when talking to the API service directly
pub const SHORT_PATH_PREFIX: &str = "/v1";
/// Token exchange endpoint of the auth service
pub const TOKENS_PATH: &str = "/auth/v1/tokens";

/// Trait for providing configuration to the API client
/// This allows the main application to implement config without circular dependencies
pub trait ApiConfig {
    type Error;

    /// Get the base URI for the API (optional, defaults to https://localhost)
    fn get_base_url(&self) -> std::result::Result<Option<String>, Self::Error> {
        Ok(None)
    }

    /// Get a static API key
    fn get_api_key(&self) -> std::result::Result<Option<String>, Self::Error> {
        Ok(None)
    }

    /// Get a previously issued auth token
    fn get_auth_token(&self) -> std::result::Result<Option<String>, Self::Error> {
        Ok(None)
    }

    /// Get username and password for token exchange
    fn get_credentials(&self) -> std::result::Result<Option<(String, String)>, Self::Error> {
        Ok(None)
    }

    fn get_verify(&self) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }

    fn get_api_prefix(&self) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }

    fn get_validate_api_key(&self) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }

    fn get_request_timeout(&self) -> std::result::Result<Option<Duration>, Self::Error> {
        Ok(None)
    }

    /// Assemble client options from the individual settings
    fn client_options(&self) -> std::result::Result<ClientOptions, Self::Error> {
        let mut options = ClientOptions::new(
            self.get_base_url()?
                .unwrap_or_else(|| DEFAULT_BASE_URI.to_string()),
        );
        options.api_key = self.get_api_key()?;
        options.auth_token = self.get_auth_token()?;
        if let Some((username, password)) = self.get_credentials()? {
            options.username = Some(username);
            options.password = Some(password);
        }
        options.verify = self.get_verify()?;
        options.api_prefix = self.get_api_prefix()?;
        options.validate_api_key = self.get_validate_api_key()?;
        options.request_timeout = self.get_request_timeout()?;
        Ok(options)
    }
}

/// Construction options for [`St2ApiClient`]
#[derive(Clone)]
pub struct ClientOptions {
    pub base_uri: String,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Verify TLS certificates
    pub verify: bool,
    /// Use `/api/v1` (true) or `/v1` (false) as the path prefix
    pub api_prefix: bool,
    /// Check the API key against the server before trusting it
    pub validate_api_key: bool,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URI)
    }
}

impl ClientOptions {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            api_key: None,
            auth_token: None,
            username: None,
            password: None,
            verify: true,
            api_prefix: true,
            validate_api_key: true,
            request_timeout: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = Some(auth_token.into());
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_api_prefix(mut self, api_prefix: bool) -> Self {
        self.api_prefix = api_prefix;
        self
    }

    pub fn with_validate_api_key(mut self, validate: bool) -> Self {
        self.validate_api_key = validate;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_uri", &self.base_uri)
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .field("auth_token", &self.auth_token.as_deref().map(mask_secret))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("verify", &self.verify)
            .field("api_prefix", &self.api_prefix)
            .field("validate_api_key", &self.validate_api_key)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Connection state shared by clones of a client.
///
/// Written only under the write lock, by `login`, `auth` and `connect`.
#[derive(Debug, Clone)]
struct Session {
    base_uri: String,
    credentials: Credentials,
    authenticated: bool,
}

/// HTTP client for the StackStorm API
#[derive(Clone)]
pub struct St2ApiClient {
    client: Client,
    path_prefix: &'static str,
    verify: bool,
    session: Arc<RwLock<Session>>,
}

impl St2ApiClient {
    /// Create an unauthenticated client. No network calls are made.
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let base_uri = normalize_base_uri(&options.base_uri)?;

        let mut builder = Client::builder().danger_accept_invalid_certs(!options.verify);
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            error!("Failed to build HTTP client: {:?}", e);
            HttpError::Request(e)
        })?;

        let path_prefix = if options.api_prefix {
            API_PATH_PREFIX
        } else {
            SHORT_PATH_PREFIX
        };

        debug!("Creating St2ApiClient");
        debug!("  Base URI: {}", base_uri);
        debug!("  Path prefix: {}", path_prefix);
        if !options.verify {
            warn!("TLS certificate verification is disabled");
        }

        Ok(Self {
            client,
            path_prefix,
            verify: options.verify,
            session: Arc::new(RwLock::new(Session {
                base_uri,
                credentials: Credentials::default(),
                authenticated: false,
            })),
        })
    }

    /// Create a client and authenticate with whatever the options supply.
    ///
    /// First match wins:
    /// 1. API key with validation disabled: trusted as-is
    /// 2. Auth token: trusted as-is
    /// 3. API key: validated with [`St2ApiClient::auth`]
    /// 4. Username or password: exchanged with [`St2ApiClient::login`]
    /// 5. Otherwise the client stays unauthenticated
    pub async fn connect(options: ClientOptions) -> Result<Self> {
        let client = Self::new(&options)?;

        let api_key = options.api_key.filter(|k| !k.is_empty());
        let auth_token = options.auth_token.filter(|t| !t.is_empty());
        let username = options.username.filter(|u| !u.is_empty());
        let password = options.password.filter(|p| !p.is_empty());

        match (api_key, auth_token) {
            (Some(key), _) if !options.validate_api_key => {
                debug!("Using API key without validation: {}", mask_secret(&key));
                client.store_authenticated(Credentials::with_api_key(key));
            }
            (_, Some(token)) => {
                debug!("Using supplied auth token: {}", mask_secret(&token));
                client.store_authenticated(Credentials::with_auth_token(token));
            }
            (Some(key), None) => {
                client.auth(None, &key).await?;
            }
            (None, None) => {
                if username.is_some() || password.is_some() {
                    client
                        .login(
                            None,
                            username.as_deref().unwrap_or_default(),
                            password.as_deref().unwrap_or_default(),
                        )
                        .await?;
                } else {
                    debug!("No credentials supplied, client is unauthenticated");
                }
            }
        }

        Ok(client)
    }

    fn store_authenticated(&self, credentials: Credentials) {
        let mut session = self.session.write();
        session.credentials = credentials;
        session.authenticated = true;
    }

    /// Exchange a username and password for an auth token.
    ///
    /// A non-2xx response leaves the client unauthenticated and is not an
    /// error; the return value reports whether a token was obtained.
    pub async fn login(&self, uri: Option<&str>, username: &str, password: &str) -> Result<bool> {
        if username.is_empty() {
            return Err(St2Error::missing_argument("username").into());
        }
        if password.is_empty() {
            return Err(St2Error::missing_argument("password").into());
        }

        let base_uri = self.resolve_base_uri(uri)?;
        let url = format!("{}{}", base_uri, TOKENS_PATH);

        debug!("Requesting auth token for '{}' from: {}", username, url);

        let response = self
            .client
            .post(&url)
            .headers(base_headers(false))
            .basic_auth(username, Some(password))
            .send()
            .await
            .map_err(|e| {
                error!("Token request failed: {:?}", e);
                HttpError::Request(e)
            })?;

        let response = match self.handle_response(response).await {
            Ok(response) => response,
            Err(e) if e.status().is_some() => {
                warn!("Login failed for '{}': {}", username, e);
                self.session.write().authenticated = false;
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let body = match decode(response).await {
            Ok(body) => body,
            Err(ApiError::Core(e)) => {
                warn!("Token response could not be decoded: {}", e);
                self.session.write().authenticated = false;
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        let token = match body.get("token") {
            Some(Value::String(token)) => token.clone(),
            _ => {
                warn!("Token response did not contain a token");
                self.session.write().authenticated = false;
                return Ok(false);
            }
        };

        {
            let mut session = self.session.write();
            session.base_uri = base_uri;
            session.credentials.api_key = None;
            session.credentials.auth_token = Some(token);
            session.authenticated = true;
        }

        info!("Logged in as '{}'", username);
        Ok(true)
    }

    /// Authenticate with a static API key, probing the API root to validate it.
    ///
    /// A non-2xx validation response discards the key, marks the client
    /// unauthenticated and is not an error; the return value reports whether
    /// the key was accepted. Credentials stored before the call are kept.
    pub async fn auth(&self, uri: Option<&str>, api_key: &str) -> Result<bool> {
        if api_key.is_empty() {
            return Err(St2Error::missing_argument("api_key").into());
        }

        let base_uri = self.resolve_base_uri(uri)?;
        let previous = {
            let mut session = self.session.write();
            let previous = session.credentials.clone();
            session.credentials.api_key = Some(api_key.to_string());
            previous
        };

        let url = format!("{}{}", base_uri, self.path_prefix);
        debug!("Validating API key {} against: {}", mask_secret(api_key), url);

        match self.send(Method::GET, &url, &[], None).await {
            Ok(_) => {
                let mut session = self.session.write();
                session.base_uri = base_uri;
                session.authenticated = true;
                drop(session);

                info!("API key accepted");
                Ok(true)
            }
            Err(e) if e.status().is_some() => {
                let mut session = self.session.write();
                session.credentials = previous;
                session.authenticated = false;
                drop(session);

                warn!("API key rejected: {}", e);
                Ok(false)
            }
            Err(e) => {
                self.session.write().credentials = previous;
                Err(e)
            }
        }
    }

    /// Whether `login` or `auth` succeeded (or a credential was trusted at construction)
    pub fn authenticated(&self) -> bool {
        self.session.read().authenticated
    }

    pub fn base_uri(&self) -> String {
        self.session.read().base_uri.clone()
    }

    pub fn path_prefix(&self) -> &'static str {
        self.path_prefix
    }

    pub fn verify(&self) -> bool {
        self.verify
    }

    pub fn credential_mode(&self) -> CredentialMode {
        self.session.read().credentials.mode()
    }

    /// GET a path and decode the response
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<ResponseValue> {
        let url = self.make_uri(path);
        let response = self.send(Method::GET, &url, params, None).await?;
        decode(response).await
    }

    /// PUT a JSON body; the response body is ignored
    pub async fn put<B>(&self, path: &str, params: &[(&str, &str)], body: &B) -> Result<bool>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        let url = self.make_uri(path);
        self.send(Method::PUT, &url, params, Some(body)).await?;
        Ok(true)
    }

    /// POST a JSON body and decode the response
    pub async fn post<B>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        body: &B,
    ) -> Result<ResponseValue>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        let url = self.make_uri(path);
        let response = self.send(Method::POST, &url, params, Some(body)).await?;
        decode(response).await
    }

    /// DELETE a path; the response body is ignored
    pub async fn delete(&self, path: &str, params: &[(&str, &str)]) -> Result<bool> {
        let url = self.make_uri(path);
        self.send(Method::DELETE, &url, params, None).await?;
        Ok(true)
    }

    fn make_uri(&self, path: &str) -> String {
        let base_uri = self.base_uri();
        match path {
            "" => format!("{}/", base_uri),
            p if p.starts_with('/') => format!("{}{}", base_uri, p),
            p => format!("{}/{}", base_uri, p),
        }
    }

    fn resolve_base_uri(&self, uri: Option<&str>) -> Result<String> {
        match uri {
            Some(uri) if !uri.is_empty() => normalize_base_uri(uri),
            _ => Ok(self.base_uri()),
        }
    }

    /// Send a request with the standard headers and the current credential
    async fn send(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let credentials = self.session.read().credentials.clone();

        let mut headers = base_headers(body.is_some());
        credentials.apply_to_headers(&mut headers)?;

        debug!("HTTP {} request to: {}", method, url);
        trace!("Request headers:");
        for (name, value) in headers.iter() {
            if credentials.header().map(|(n, _)| n == name).unwrap_or(false) {
                trace!(
                    "  {}: {}",
                    name,
                    mask_secret(value.to_str().unwrap_or_default())
                );
            } else {
                trace!("  {}: {:?}", name, value);
            }
        }

        let mut request = self.client.request(method.clone(), url).headers(headers);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            trace!("Request body: {}", String::from_utf8_lossy(&body));
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("{} request failed: {:?}", method, e);
            HttpError::Request(e)
        })?;

        debug!("Response status: {}", response.status());

        self.handle_response(response).await
    }

    /// Handle HTTP response and convert errors
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            debug!("Request successful with status: {}", status);
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        error!("Request failed with status: {}", status);
        debug!("Error response body: {}", error_text);

        Err(ApiError::Http(HttpError::from_status(status, &url)))
    }
}

impl fmt::Debug for St2ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.session.read();
        f.debug_struct("St2ApiClient")
            .field("base_uri", &session.base_uri)
            .field("path_prefix", &self.path_prefix)
            .field("verify", &self.verify)
            .field("credential_mode", &session.credentials.mode())
            .field("authenticated", &session.authenticated)
            .finish()
    }
}

/// Decode a success body into a [`ResponseValue`]
async fn decode(response: Response) -> Result<ResponseValue> {
    let text = response.text().await.map_err(HttpError::Request)?;
    trace!("Response body: {}", text);
    Ok(ResponseValue::from_json_text(&text)?)
}

fn encode_body<B>(body: &B) -> Result<Vec<u8>>
where
    B: Serialize + ?Sized,
{
    serde_json::to_vec(body).map_err(|e| {
        error!("Failed to encode request body: {}", e);
        St2Error::InvalidInput(format!("invalid body data: {}", e)).into()
    })
}

/// Validate a base URI and strip any trailing slash
pub fn normalize_base_uri(uri: &str) -> Result<String> {
    let parsed = url::Url::parse(uri)
        .map_err(|e| St2Error::InvalidInput(format!("invalid base URI '{}': {}", uri, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(St2Error::InvalidInput(format!(
            "base URI '{}' must use http:// or https://",
            uri
        ))
        .into());
    }

    Ok(uri.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_base_uri() {
        assert_eq!(
            normalize_base_uri("https://st2.example.com/").unwrap(),
            "https://st2.example.com"
        );
        assert_eq!(
            normalize_base_uri("http://127.0.0.1:9101").unwrap(),
            "http://127.0.0.1:9101"
        );
        assert!(normalize_base_uri("st2.example.com").is_err());
        assert!(normalize_base_uri("ftp://st2.example.com").is_err());
    }

    #[test]
    fn test_new_client_defaults() {
        let client = St2ApiClient::new(&ClientOptions::default()).unwrap();
        assert_eq!(client.base_uri(), "https://localhost");
        assert_eq!(client.path_prefix(), "/api/v1");
        assert!(client.verify());
        assert!(!client.authenticated());
        assert_eq!(client.credential_mode(), CredentialMode::None);
    }

    #[test]
    fn test_short_prefix() {
        let options = ClientOptions::default().with_api_prefix(false);
        let client = St2ApiClient::new(&options).unwrap();
        assert_eq!(client.path_prefix(), "/v1");
    }

    #[test]
    fn test_make_uri() {
        let client = St2ApiClient::new(&ClientOptions::new("https://st2/")).unwrap();
        assert_eq!(client.make_uri(""), "https://st2/");
        assert_eq!(client.make_uri("/api/v1"), "https://st2/api/v1");
        assert_eq!(client.make_uri("api/v1"), "https://st2/api/v1");
    }

    #[test]
    fn test_encode_body_rejects_unserializable() {
        use std::collections::HashMap;

        // JSON object keys must be strings
        let mut body = HashMap::new();
        body.insert(vec![1u8], "x");

        let err = encode_body(&body).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("invalid body data"));

        assert_eq!(encode_body(&json!({"a": 1})).unwrap(), br#"{"a":1}"#.to_vec());
    }

    #[test]
    fn test_options_debug_masks_secrets() {
        let options = ClientOptions::default()
            .with_api_key("abcd1234efgh5678")
            .with_credentials("st2admin", "hunter2");
        let debug = format!("{:?}", options);
        assert!(debug.contains("abcd...5678"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_connect_trusts_unvalidated_key() {
        let options = ClientOptions::default()
            .with_api_key("key")
            .with_validate_api_key(false);
        let client = St2ApiClient::connect(options).await.unwrap();
        assert!(client.authenticated());
        assert_eq!(client.credential_mode(), CredentialMode::ApiKey);
    }

    #[tokio::test]
    async fn test_connect_trusts_token() {
        let options = ClientOptions::default().with_auth_token("tok");
        let client = St2ApiClient::connect(options).await.unwrap();
        assert!(client.authenticated());
        assert_eq!(client.credential_mode(), CredentialMode::Token);
    }

    #[tokio::test]
    async fn test_login_requires_username_and_password() {
        let client = St2ApiClient::new(&ClientOptions::default()).unwrap();
        assert!(client
            .login(None, "", "pw")
            .await
            .unwrap_err()
            .is_invalid_argument());
        assert!(client
            .login(None, "user", "")
            .await
            .unwrap_err()
            .is_invalid_argument());
    }

    #[tokio::test]
    async fn test_auth_requires_key() {
        let client = St2ApiClient::new(&ClientOptions::default()).unwrap();
        assert!(client.auth(None, "").await.unwrap_err().is_invalid_argument());
    }

    #[tokio::test]
    async fn test_connect_with_only_username_is_invalid() {
        let options = ClientOptions {
            username: Some("st2admin".to_string()),
            ..ClientOptions::default()
        };
        let err = St2ApiClient::connect(options).await.unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
