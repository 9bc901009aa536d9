//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the PaymentBackend port
//! - an in-process mock payment server for tests

pub mod http;

#[cfg(test)]
pub mod mock_backend;
