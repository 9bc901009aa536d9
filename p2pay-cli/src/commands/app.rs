//! App command - the interactive payment screen
//!
//! Renders the feed and status line, then lets the user pick an action and
//! fill in its form. The session token lives only as long as this command.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password, Select};
use p2pay_core::{Action, LogEvent, LoggingService, Outcome, Screen};

use super::{get_context, log_event, log_outcome};
use crate::output;

/// `logger` is opened by the caller with the interactive entry point
pub fn run(logger: &Option<LoggingService>) -> Result<()> {
    if atty::isnt(atty::Stream::Stdin) {
        anyhow::bail!("'p2p app' needs an interactive terminal. Use the one-shot commands instead.");
    }

    let ctx = get_context(None)?;
    log_event(logger, LogEvent::new("app_opened").with_command("app"));

    let pb = output::spinner("Loading feed...");
    let mut screen = ctx.open_screen();
    pb.finish_and_clear();

    let mut items: Vec<String> = Action::ALL.iter().map(|a| a.to_string()).collect();
    items.push("Quit".to_string());

    loop {
        render(&screen, &ctx.config.api_url);

        let choice = Select::new()
            .with_prompt("Action")
            .items(&items)
            .default(0)
            .interact()?;

        let Some(&action) = Action::ALL.get(choice) else {
            break;
        };

        fill_form(&mut screen, action)?;

        let pb = output::spinner(&format!("{}...", action));
        let outcome = screen.submit(action);
        pb.finish_and_clear();

        match &outcome {
            Outcome::Completed => log_outcome(logger, "app", action, None),
            Outcome::Failed(e) => log_outcome(logger, "app", action, Some(e)),
            Outcome::Skipped => {}
        }
    }

    log_event(logger, LogEvent::new("app_closed").with_command("app"));
    Ok(())
}

fn render(screen: &Screen, api_url: &str) {
    println!();
    println!("{}", "P2P Payments".bold());
    let session = if screen.is_authenticated() {
        "logged in".green()
    } else {
        "not logged in".yellow()
    };
    println!("  Server: {}  |  {}", api_url.dimmed(), session);
    println!();
    output::print_feed(screen.feed());
    if let Some(status) = screen.status() {
        println!();
        println!("{}", status.red().italic());
    }
    println!();
}

/// Prompt for the fields of the form behind `action`, pre-filled with what
/// the form still holds
fn fill_form(screen: &mut Screen, action: Action) -> Result<()> {
    match action {
        Action::CreateUser => {
            screen.user_form.username = prompt("Username", &screen.user_form.username)?;
        }
        Action::Signup | Action::Login => {
            screen.auth_form.username = prompt("Username", &screen.auth_form.username)?;
            screen.auth_form.password = Password::new()
                .with_prompt("Password")
                .allow_empty_password(true)
                .interact()?;
        }
        Action::Deposit => {
            let form = &mut screen.deposit_form;
            form.username = prompt("Username", &form.username)?;
            form.amount = prompt("Amount", &form.amount)?;
        }
        Action::Transfer => {
            let form = &mut screen.transfer_form;
            form.sender = prompt("Sender", &form.sender)?;
            form.recipient = prompt("Recipient", &form.recipient)?;
            form.amount = prompt("Amount", &form.amount)?;
            form.message = prompt("Message (optional)", &form.message)?;
        }
        Action::Logout | Action::RefreshFeed => {}
    }
    Ok(())
}

fn prompt(label: &str, current: &str) -> Result<String> {
    Ok(Input::<String>::new()
        .with_prompt(label)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?)
}
