//! p2pay Core - client library for the P2P payment backend
//!
//! This crate implements the client following hexagonal architecture:
//!
//! - **domain**: Request/response bodies and the forms they come from
//! - **ports**: Trait definitions for external dependencies (PaymentBackend)
//! - **services**: Session, screen view-state and event logging
//! - **adapters**: Concrete implementations (reqwest HTTP client)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
mod log_migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result as AnyResult};

use adapters::http::HttpBackend;
use config::Config;
use services::PaymentService;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{
    AuthForm, Credentials, DepositForm, DepositRequest, FeedEntry, NewUser, Token, TransferForm,
    TransferRequest, UserForm,
};
pub use ports::{ApiMessage, PaymentBackend};
pub use services::{Action, EntryPoint, LogEntry, LogEvent, LoggingService, Outcome, Screen};

/// Main context for p2pay operations
///
/// Holds the configuration, the HTTP backend and the payment service built
/// on top of it.
pub struct P2payContext {
    pub config: Config,
    pub backend: Arc<HttpBackend>,
    pub payment_service: Arc<PaymentService>,
}

impl P2payContext {
    /// Create a new context from the settings in `data_dir`
    pub fn new(data_dir: &Path) -> AnyResult<Self> {
        let config = Config::load(data_dir)?;
        Self::with_config(config)
    }

    /// Create a context from an already loaded config
    pub fn with_config(config: Config) -> AnyResult<Self> {
        let backend = Arc::new(
            HttpBackend::new(&config.api_url, config.timeout())
                .with_context(|| format!("Failed to set up client for {}", config.api_url))?,
        );
        let payment_service = Arc::new(PaymentService::new(backend.clone()));

        Ok(Self {
            config,
            backend,
            payment_service,
        })
    }

    /// Open the interactive screen, loading the feed once
    pub fn open_screen(&self) -> Screen {
        Screen::open(Arc::clone(&self.payment_service))
    }
}
