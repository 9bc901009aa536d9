//! CLI command implementations

pub mod app;
pub mod auth;
pub mod config;
pub mod deposit;
pub mod feed;
pub mod logs;
pub mod transfer;
pub mod user;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::Password;
use p2pay_core::{
    Action, EntryPoint, LogEvent, LoggingService, OperationResult, P2payContext, Token,
};
use serde::Serialize;

/// Open the process-wide logging service
///
/// Called once from `main`; commands receive the handle. Returns None if
/// logging fails to initialize (shouldn't block operations).
pub fn open_logger(entry_point: EntryPoint) -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, entry_point, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Log the outcome of one backend action
///
/// Input errors are not logged: nothing was sent. Failures record the error
/// kind and HTTP status, never the backend's detail text.
pub fn log_outcome(
    logger: &Option<LoggingService>,
    command: &str,
    action: Action,
    error: Option<&p2pay_core::Error>,
) {
    let mut event = match error {
        None => LogEvent::new(format!("{}_completed", action.name())),
        Some(e) if e.is_input_error() => return,
        Some(e) => {
            let mut event =
                LogEvent::new(format!("{}_failed", action.name())).with_error(e.kind());
            if let Some(status) = e.status() {
                event = event
                    .with_http_status(status)
                    .with_error_details(format!("HTTP {}", status));
            }
            event
        }
    };
    event = event.with_command(command);
    if let Some(endpoint) = action.endpoint() {
        event = event.with_endpoint(endpoint);
    }
    log_event(logger, event);
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("P2PAY_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".p2pay"))
}

/// Build the context, optionally starting the session with a known token
pub fn get_context(token: Option<String>) -> Result<P2payContext> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let ctx = P2payContext::new(&data_dir).context("Failed to initialize p2pay context")?;

    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        ctx.payment_service
            .set_token(Some(Token::new(token.trim())))?;
    }

    Ok(ctx)
}

/// Resolve a password: flag, then P2PAY_PASSWORD, then an interactive prompt
pub fn get_password(password_flag: Option<String>, confirm: bool) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }

    if let Ok(p) = env::var("P2PAY_PASSWORD") {
        return Ok(p);
    }

    if atty::isnt(atty::Stream::Stdin) {
        anyhow::bail!("No password given. Use --password or set P2PAY_PASSWORD.");
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

/// Render an action result as a pretty `OperationResult`, plus whether it failed
fn json_report<T: Serialize>(result: p2pay_core::Result<T>) -> Result<(String, bool)> {
    let failed = result.is_err();
    let op: OperationResult<T> = result.into();
    Ok((serde_json::to_string_pretty(&op)?, failed))
}

/// Print the result of an action and turn a failure into a non-zero exit
///
/// In JSON mode the result is printed as an `OperationResult`; failures
/// exit directly so the error is not printed twice.
pub fn finish<T: Serialize>(
    json: bool,
    result: p2pay_core::Result<T>,
    on_success: impl FnOnce(&T),
) -> Result<()> {
    if json {
        let (report, failed) = json_report(result)?;
        println!("{}", report);
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    match result {
        Ok(data) => {
            on_success(&data);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
