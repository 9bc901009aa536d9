//! Core domain entities
//!
//! Request/response bodies of the payment backend and the forms they are
//! built from. Pure data with validation logic - no I/O.

pub mod form;
mod payment;
pub mod result;
mod user;

pub use form::{AuthForm, DepositForm, TransferForm, UserForm};
pub use payment::{DepositRequest, FeedEntry, TransferRequest};
pub use user::{Credentials, NewUser, Token};
