//! Signup and login commands

use anyhow::Result;
use colored::Colorize;
use p2pay_core::{Action, AuthForm, LoggingService};
use serde::Serialize;

use super::{finish, get_context, get_password, log_outcome};
use crate::output;

/// JSON shape of a successful login
#[derive(Serialize)]
struct LoginOutput {
    message: String,
    token: String,
}

pub fn run_signup(
    username: String,
    password: Option<String>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let password = get_password(password, true)?;
    let ctx = get_context(None)?;

    let form = AuthForm { username, password };
    let pb = output::spinner("Signing up...");
    let result = ctx.payment_service.signup(&form);
    pb.finish_and_clear();

    log_outcome(logger, "signup", Action::Signup, result.as_ref().err());
    finish(json, result, |msg| {
        output::success(msg);
        println!("Run 'p2p login {}' to get a token.", form.username.trim());
    })
}

pub fn run_login(
    username: String,
    password: Option<String>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let password = get_password(password, false)?;
    let ctx = get_context(None)?;

    let form = AuthForm { username, password };
    let pb = output::spinner("Logging in...");
    let result = ctx.payment_service.login(&form).and_then(|message| {
        let token = ctx
            .payment_service
            .token()?
            .map(|t| t.secret().to_string())
            .unwrap_or_default();
        Ok(LoginOutput { message, token })
    });
    pb.finish_and_clear();

    log_outcome(logger, "login", Action::Login, result.as_ref().err());
    finish(json, result, |out| {
        output::success(&out.message);
        println!();
        println!("Token: {}", out.token.bold());
        println!();
        output::info("Pass it to later commands with --token, or:");
        println!("  export P2PAY_TOKEN={}", out.token);
    })
}
