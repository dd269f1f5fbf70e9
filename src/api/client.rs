//! Quovo API client implementation

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::envelope::{Envelope, RequestRecord};
use super::error::ApiError;
use crate::config::ApiConfig;

/// Authentication applied to a single request.
#[derive(Debug, Clone, Copy)]
pub enum AuthMode<'a> {
    /// Basic credentials, for the bootstrap `/tokens` calls.
    Basic(&'a str, &'a str),

    /// Attach the stored Access Token, when one has been issued.
    Bearer,
}

/// Thin client for the fixed Quovo v2 endpoint surface.
///
/// The client itself is immutable: [`QuovoClient::with_token`] returns a
/// new authenticated instance instead of mutating stored state.
#[derive(Debug, Clone)]
pub struct QuovoClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl QuovoClient {
    /// Create an unauthenticated client against the configured base URL.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: None,
        })
    }

    /// A copy of this client that authenticates every Bearer-mode request
    /// with the given Access Token.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Single dispatch point for every API call. GET requests serialize
    /// `params` into the query string, POST requests into a JSON body.
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<Value>,
        auth: AuthMode<'_>,
    ) -> Result<Envelope, ApiError> {
        let mut url = self.endpoint(path);

        let mut headers: Vec<(String, String)> = Vec::new();
        match auth {
            AuthMode::Basic(username, password) => {
                let raw = BASE64.encode(format!("{username}:{password}"));
                headers.push(("Authorization".to_string(), format!("Basic {raw}")));
            }
            AuthMode::Bearer => {
                if let Some(token) = &self.token {
                    headers.push(("Authorization".to_string(), format!("Bearer {token}")));
                }
            }
        }

        let body = if method == Method::POST {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            Some(params.unwrap_or_else(|| json!({})))
        } else {
            if let Some(params) = &params {
                append_query(&mut url, params);
            }
            None
        };

        let mut builder = self.http.request(method.clone(), &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &body {
            builder = builder.body(body.to_string());
        }

        debug!("{} {}", method, url);
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed = if text.trim().is_empty() {
            // 204 responses carry no body.
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => value,
                // Error bodies are not always JSON; keep them displayable.
                Err(_) if !good_status(status) => Value::String(text),
                Err(err) => return Err(err.into()),
            }
        };

        debug!("{} returned {}", path, status);
        let envelope = Envelope {
            request: RequestRecord {
                method: method.to_string(),
                url,
                headers,
                body,
            },
            response: parsed,
        };
        check_status(status, envelope)
    }

    /// Authenticates API user credentials. A valid pair returns the
    /// user's available Access Tokens.
    pub async fn check_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Envelope, ApiError> {
        self.request(Method::GET, "/tokens", None, AuthMode::Basic(username, password))
            .await
    }

    /// Creates a new API Access Token.
    pub async fn create_token(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<Envelope, ApiError> {
        self.request(
            Method::POST,
            "/tokens",
            Some(json!({ "name": name })),
            AuthMode::Basic(username, password),
        )
        .await
    }

    /// Creates a Quovo User.
    pub async fn create_user(&self, username: &str) -> Result<Envelope, ApiError> {
        self.request(
            Method::POST,
            "/users",
            Some(json!({ "username": username })),
            AuthMode::Bearer,
        )
        .await
    }

    /// Creates a new Account on the given User. The credentials here are
    /// an institution login, not API user credentials.
    pub async fn create_account(
        &self,
        user_id: u64,
        brokerage_id: u64,
        username: &str,
        password: &str,
    ) -> Result<Envelope, ApiError> {
        self.request(
            Method::POST,
            &format!("/users/{user_id}/accounts"),
            Some(json!({
                "brokerage": brokerage_id,
                "username": username,
                "password": password
            })),
            AuthMode::Bearer,
        )
        .await
    }

    /// Initiates a sync on the given Account.
    pub async fn sync_account(&self, account_id: u64) -> Result<Envelope, ApiError> {
        self.request(
            Method::POST,
            &format!("/accounts/{account_id}/sync"),
            None,
            AuthMode::Bearer,
        )
        .await
    }

    /// Gets the current sync status on an Account.
    pub async fn sync_status(&self, account_id: u64) -> Result<Envelope, ApiError> {
        self.request(
            Method::GET,
            &format!("/accounts/{account_id}/sync"),
            None,
            AuthMode::Bearer,
        )
        .await
    }

    /// Fetches all of an Account's Portfolios.
    pub async fn account_portfolios(&self, account_id: u64) -> Result<Envelope, ApiError> {
        self.request(
            Method::GET,
            &format!("/accounts/{account_id}/portfolios"),
            None,
            AuthMode::Bearer,
        )
        .await
    }

    /// Fetches information on a single Portfolio.
    pub async fn portfolio(&self, portfolio_id: u64) -> Result<Envelope, ApiError> {
        self.request(
            Method::GET,
            &format!("/portfolios/{portfolio_id}"),
            None,
            AuthMode::Bearer,
        )
        .await
    }

    /// Fetches a Portfolio's holdings.
    pub async fn portfolio_positions(&self, portfolio_id: u64) -> Result<Envelope, ApiError> {
        self.request(
            Method::GET,
            &format!("/portfolios/{portfolio_id}/positions"),
            None,
            AuthMode::Bearer,
        )
        .await
    }

    /// Fetches a Portfolio's available transaction History.
    pub async fn portfolio_history(&self, portfolio_id: u64) -> Result<Envelope, ApiError> {
        self.request(
            Method::GET,
            &format!("/portfolios/{portfolio_id}/history"),
            None,
            AuthMode::Bearer,
        )
        .await
    }
}

fn good_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 200 | 201 | 204)
}

/// Checks for a non-good status code, converting it into a typed error
/// carrying the server's message and the full failed exchange.
fn check_status(status: StatusCode, envelope: Envelope) -> Result<Envelope, ApiError> {
    if good_status(status) {
        return Ok(envelope);
    }
    let message = envelope
        .response
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_owned()
        });
    Err(ApiError::Request {
        message,
        status,
        envelope,
    })
}

fn append_query(url: &mut String, params: &Value) {
    if let Some(object) = params.as_object() {
        let pairs: Vec<String> = object
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{key}={s}"),
                other => format!("{key}={other}"),
            })
            .collect();
        if !pairs.is_empty() {
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> QuovoClient {
        let config = ApiConfig {
            base_url: server.uri().parse().unwrap(),
            ..ApiConfig::default()
        };
        QuovoClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn good_status_returns_full_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokens"))
            .and(header("Authorization", "Basic ZGVtbzpzZWNyZXQ="))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_tokens": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let envelope = client_for(&server)
            .check_credentials("demo", "secret")
            .await
            .unwrap();
        assert_eq!(envelope.request.method, "GET");
        assert!(envelope.request.url.ends_with("/tokens"));
        assert!(envelope
            .request
            .headers
            .iter()
            .any(|(name, value)| name == "Authorization" && value == "Basic ZGVtbzpzZWNyZXQ="));
        assert!(envelope.request.body.is_none());
        assert_eq!(envelope.response, json!({ "access_tokens": [] }));
    }

    #[tokio::test]
    async fn non_good_status_carries_server_message_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokens"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "message": "Invalid API credentials" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .check_credentials("demo", "wrong")
            .await
            .unwrap_err();
        match err {
            ApiError::Request {
                message,
                status,
                envelope,
            } => {
                assert_eq!(message, "Invalid API credentials");
                assert_eq!(status.as_u16(), 401);
                assert_eq!(envelope.response["message"], "Invalid API credentials");
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bearer_token_attached_only_after_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "user": { "id": 1, "username": "alice" }
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.create_user("alice").await.unwrap();
        let authed = client.with_token("tok_abc");
        authed.create_user("alice").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].headers.contains_key("authorization"));
        assert_eq!(
            requests[1]
                .headers
                .get("authorization")
                .and_then(|value| value.to_str().ok()),
            Some("Bearer tok_abc")
        );
    }

    #[tokio::test]
    async fn post_serializes_params_as_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({ "username": "alice" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "user": { "id": 1, "username": "alice" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = client_for(&server).create_user("alice").await.unwrap();
        assert_eq!(envelope.request.body, Some(json!({ "username": "alice" })));
    }

    #[tokio::test]
    async fn no_content_response_maps_to_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/5/sync"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let envelope = client_for(&server)
            .with_token("tok")
            .sync_account(5)
            .await
            .unwrap();
        assert_eq!(envelope.response, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back_to_status_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portfolios/9"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .with_token("tok")
            .portfolio(9)
            .await
            .unwrap_err();
        match err {
            ApiError::Request {
                message, envelope, ..
            } => {
                assert_eq!(message, "Internal Server Error");
                assert_eq!(envelope.response, json!("upstream exploded"));
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }

    #[test]
    fn query_params_append_to_the_url() {
        let mut url = "https://api.quovo.com/v2/tokens".to_string();
        append_query(&mut url, &json!({ "limit": 10, "cursor": "abc" }));
        assert_eq!(url, "https://api.quovo.com/v2/tokens?cursor=abc&limit=10");
    }
}
