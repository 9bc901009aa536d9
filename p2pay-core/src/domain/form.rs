//! Form state and validation
//!
//! Forms hold exactly what the user typed. Turning a form into a request
//! body is the only place input is checked; nothing is sent when a check
//! fails.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::payment::{DepositRequest, TransferRequest};
use super::result::{Error, Result};
use super::user::{Credentials, NewUser};

/// Fail with every field whose value is blank, in the order given
pub fn require_fields(fields: &[(&'static str, &str)]) -> Result<()> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingFields(missing))
    }
}

/// Parse a user-typed amount
///
/// Accepts a comma as decimal separator. The amount must be positive.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let normalized = text.trim().replace(',', ".");
    let amount = Decimal::from_str(&normalized)
        .map_err(|_| Error::validation(format!("'{}' is not a valid amount", text.trim())))?;

    if amount <= Decimal::ZERO {
        return Err(Error::validation("Amount must be greater than zero"));
    }
    Ok(amount)
}

/// "Create user" form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub username: String,
}

impl UserForm {
    pub fn to_request(&self) -> Result<NewUser> {
        require_fields(&[("username", self.username.as_str())])?;
        Ok(NewUser::new(self.username.trim()))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Signup / login form
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AuthForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AuthForm {
    /// Passwords are sent verbatim; only the username is trimmed
    pub fn to_request(&self) -> Result<Credentials> {
        require_fields(&[
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ])?;
        Ok(Credentials::new(self.username.trim(), self.password.as_str()))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// "Deposit funds" form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositForm {
    pub username: String,
    pub amount: String,
}

impl DepositForm {
    pub fn to_request(&self) -> Result<DepositRequest> {
        require_fields(&[
            ("username", self.username.as_str()),
            ("amount", self.amount.as_str()),
        ])?;
        Ok(DepositRequest {
            username: self.username.trim().to_string(),
            amount: parse_amount(&self.amount)?,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// "Transfer funds" form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub sender: String,
    pub recipient: String,
    pub amount: String,
    /// Optional
    pub message: String,
}

impl TransferForm {
    pub fn to_request(&self) -> Result<TransferRequest> {
        require_fields(&[
            ("sender", self.sender.as_str()),
            ("recipient", self.recipient.as_str()),
            ("amount", self.amount.as_str()),
        ])?;
        Ok(TransferRequest {
            sender: self.sender.trim().to_string(),
            recipient: self.recipient.trim().to_string(),
            amount: parse_amount(&self.amount)?,
            message: self.message.trim().to_string(),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
