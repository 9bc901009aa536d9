//! Payment service - one method per backend action
//!
//! Validates a form, issues exactly one backend call and turns the reply
//! into a status message. Holds the session token in memory after login.

use std::sync::{Arc, RwLock};

use crate::domain::result::{Error, Result};
use crate::domain::{AuthForm, DepositForm, FeedEntry, Token, TransferForm, UserForm};
use crate::ports::PaymentBackend;

/// Payment service with an in-memory session
pub struct PaymentService {
    backend: Arc<dyn PaymentBackend>,
    token: RwLock<Option<Token>>,
}

impl PaymentService {
    pub fn new(backend: Arc<dyn PaymentBackend>) -> Self {
        Self {
            backend,
            token: RwLock::new(None),
        }
    }

    /// Create a user (`POST /users`)
    pub fn create_user(&self, form: &UserForm) -> Result<String> {
        let user = form.to_request()?;
        self.backend.create_user(&user)?;
        Ok(format!("User {} created", user.username))
    }

    /// Register an account (`POST /signup`)
    pub fn signup(&self, form: &AuthForm) -> Result<String> {
        let credentials = form.to_request()?;
        let reply = self.backend.signup(&credentials)?;
        Ok(reply.or(format!("Account {} created", credentials.username)))
    }

    /// Log in and keep the returned token for later calls
    ///
    /// A failed login leaves the current session untouched.
    pub fn login(&self, form: &AuthForm) -> Result<String> {
        let credentials = form.to_request()?;
        let token = self.backend.login(&credentials)?;
        self.set_token(Some(token))?;
        Ok(format!("Logged in as {}", credentials.username))
    }

    /// Drop the session token. Returns whether one was held.
    pub fn logout(&self) -> Result<bool> {
        let mut guard = self.token.write().map_err(lock_error)?;
        Ok(guard.take().is_some())
    }

    /// Deposit funds (`POST /deposit`), bearer-authenticated when logged in
    pub fn deposit(&self, form: &DepositForm) -> Result<String> {
        let request = form.to_request()?;
        let token = self.token()?;
        let reply = self.backend.deposit(&request, token.as_ref())?;
        Ok(reply.or("Deposit completed"))
    }

    /// Transfer funds (`POST /transfer`), bearer-authenticated when logged in
    pub fn transfer(&self, form: &TransferForm) -> Result<String> {
        let request = form.to_request()?;
        let token = self.token()?;
        let reply = self.backend.transfer(&request, token.as_ref())?;
        Ok(reply.or("Transfer completed"))
    }

    /// Fetch the activity feed (`GET /feed`)
    pub fn feed(&self) -> Result<Vec<FeedEntry>> {
        self.backend.feed()
    }

    /// Current session token
    pub fn token(&self) -> Result<Option<Token>> {
        let guard = self.token.read().map_err(lock_error)?;
        Ok(guard.clone())
    }

    /// Replace the session token (e.g. from `--token`)
    pub fn set_token(&self, token: Option<Token>) -> Result<()> {
        let mut guard = self.token.write().map_err(lock_error)?;
        *guard = token;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().map(|t| t.is_some()).unwrap_or(false)
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> Error {
    Error::Other(format!("Session lock poisoned: {}", e))
}
