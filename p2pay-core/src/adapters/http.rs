//! Payment backend HTTP client
//!
//! Talks JSON to the payment API over reqwest's blocking client. One call,
//! one request: nothing here retries or caches.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::{Credentials, DepositRequest, FeedEntry, NewUser, Token, TransferRequest};
use crate::ports::{ApiMessage, PaymentBackend};

/// Default backend URL (local development server)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fallback status text when the backend gives no detail
const GENERIC_ERROR: &str = "Error";

/// HTTP implementation of [`PaymentBackend`]
#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post<B: Serialize>(&self, path: &str, body: &B, token: Option<&Token>) -> RequestBuilder {
        let request = self.client.post(self.url(path)).json(body);
        match token {
            Some(token) => request.bearer_auth(token.secret()),
            None => request,
        }
    }

    /// Send the request and return the body of a successful response
    fn execute(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().map_err(|e| self.map_request_error(e))?;
        let status = response.status();
        let body = response.text().map_err(|e| self.map_request_error(e))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::api(status.as_u16(), extract_detail(&body)))
        }
    }

    fn execute_json<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R> {
        let body = self.execute(request)?;
        serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Like `execute_json`, but an empty body is a message-less success
    fn execute_message(&self, request: RequestBuilder) -> Result<ApiMessage> {
        let body = self.execute(request)?;
        if body.trim().is_empty() {
            return Ok(ApiMessage::default());
        }
        serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::network(format!(
                "Connection timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::network(format!(
                "Unable to reach payment server at {}",
                self.base_url
            ))
        } else {
            Error::network(format!("Request failed: {}", error))
        }
    }
}

impl PaymentBackend for HttpBackend {
    fn create_user(&self, user: &NewUser) -> Result<ApiMessage> {
        self.execute_message(self.post("/users", user, None))
    }

    fn signup(&self, credentials: &Credentials) -> Result<ApiMessage> {
        self.execute_message(self.post("/signup", credentials, None))
    }

    fn login(&self, credentials: &Credentials) -> Result<Token> {
        self.execute_json(self.post("/login", credentials, None))
    }

    fn deposit(&self, request: &DepositRequest, token: Option<&Token>) -> Result<ApiMessage> {
        self.execute_message(self.post("/deposit", request, token))
    }

    fn transfer(&self, request: &TransferRequest, token: Option<&Token>) -> Result<ApiMessage> {
        self.execute_message(self.post("/transfer", request, token))
    }

    fn feed(&self) -> Result<Vec<FeedEntry>> {
        self.execute_json(self.client.get(self.url("/feed")))
    }
}

/// Validate a base URL and strip trailing slashes
pub fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", trimmed, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Invalid API URL '{}': scheme must be http or https",
            trimmed
        )));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Pull a displayable message out of an error body
///
/// Understands `{"detail": "..."}`, validation lists
/// `{"detail": [{"msg": "..."}, ...]}`, and plain `error`/`message` fields.
fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<JsonValue>(body) else {
        return GENERIC_ERROR.to_string();
    };

    let detail = match value.get("detail") {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    };

    detail
        .or_else(|| {
            ["error", "message"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(String::from))
        })
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| GENERIC_ERROR.to_string())
}
