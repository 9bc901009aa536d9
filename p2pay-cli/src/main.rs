//! p2pay CLI - send money between users from your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{app, auth, config, deposit, feed, logs, transfer, user};
use p2pay_core::{EntryPoint, LoggingService, TransferForm};

/// p2pay - peer-to-peer payments from your terminal
#[derive(Parser)]
#[command(name = "p2p", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// Create an account with a password
    Signup {
        /// Username for the account
        username: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in and print a bearer token
    Login {
        /// Username
        username: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit funds for a user
    Deposit {
        /// User receiving the funds
        username: String,
        /// Amount, e.g. 50 or 12.5
        amount: String,
        /// Bearer token from 'p2p login'
        #[arg(long, env = "P2PAY_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transfer funds between users
    Transfer {
        /// Sending user
        sender: String,
        /// Receiving user
        recipient: String,
        /// Amount, e.g. 20 or 7.5
        amount: String,
        /// Optional message shown in the feed
        #[arg(short, long, default_value = "")]
        message: String,
        /// Bearer token from 'p2p login'
        #[arg(long, env = "P2PAY_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the activity feed
    Feed {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open the interactive payment screen
    App,

    /// View and change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage the local event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::User { .. } => "user",
            Commands::Signup { .. } => "signup",
            Commands::Login { .. } => "login",
            Commands::Deposit { .. } => "deposit",
            Commands::Transfer { .. } => "transfer",
            Commands::Feed { .. } => "feed",
            Commands::App => "app",
            Commands::Config { .. } => "config",
            Commands::Logs { .. } => "logs",
        }
    }

    fn entry_point(&self) -> EntryPoint {
        match self {
            Commands::App => EntryPoint::Interactive,
            _ => EntryPoint::Cli,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();

    // The only handle on logs.duckdb for this process
    let logger = commands::open_logger(cli.command.entry_point());
    if let Some(l) = &logger {
        let _ = l.log_command(name);
    }

    match run(cli, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Backend failures were logged by the command; input errors never are
            let handled = e
                .downcast_ref::<p2pay_core::Error>()
                .is_some_and(|err| err.is_backend_error() || err.is_input_error());
            if let (Some(l), false) = (&logger, handled) {
                let _ = l.log_error("command_failed", &e.to_string(), Some(name));
            }
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, logger: &Option<LoggingService>) -> Result<()> {
    match cli.command {
        Commands::User { command } => user::run(command, logger),
        Commands::Signup { username, password, json } => {
            auth::run_signup(username, password, json, logger)
        }
        Commands::Login { username, password, json } => {
            auth::run_login(username, password, json, logger)
        }
        Commands::Deposit { username, amount, token, json } => {
            deposit::run(username, amount, token, json, logger)
        }
        Commands::Transfer { sender, recipient, amount, message, token, json } => {
            let form = TransferForm { sender, recipient, amount, message };
            transfer::run(form, token, json, logger)
        }
        Commands::Feed { json } => feed::run(json, logger),
        Commands::App => app::run(logger),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command, logger),
    }
}
