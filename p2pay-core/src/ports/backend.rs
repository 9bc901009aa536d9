//! Payment backend port
//!
//! Defines the interface to the remote payment API. Every method is a single
//! request/response round trip; implementations must not retry.

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::domain::{Credentials, DepositRequest, FeedEntry, NewUser, Token, TransferRequest};

/// Success body of the mutating endpoints
///
/// The backend usually answers `{"message": "..."}`, but an empty body or
/// any other object is also a success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// The backend's message, or `fallback` when it sent none
    pub fn or(self, fallback: impl Into<String>) -> String {
        self.message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.into())
    }
}

/// Payment backend trait
///
/// `deposit` and `transfer` take an optional bearer token; implementations
/// forward it when present and send the request unauthenticated otherwise.
pub trait PaymentBackend: Send + Sync {
    /// `POST /users`
    fn create_user(&self, user: &NewUser) -> Result<ApiMessage>;

    /// `POST /signup`
    fn signup(&self, credentials: &Credentials) -> Result<ApiMessage>;

    /// `POST /login`
    fn login(&self, credentials: &Credentials) -> Result<Token>;

    /// `POST /deposit`
    fn deposit(&self, request: &DepositRequest, token: Option<&Token>) -> Result<ApiMessage>;

    /// `POST /transfer`
    fn transfer(&self, request: &TransferRequest, token: Option<&Token>) -> Result<ApiMessage>;

    /// `GET /feed`
    fn feed(&self) -> Result<Vec<FeedEntry>>;
}
