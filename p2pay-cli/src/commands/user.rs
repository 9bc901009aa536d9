//! User command - create users on the backend

use anyhow::Result;
use clap::Subcommand;
use p2pay_core::{Action, LoggingService, UserForm};

use super::{finish, get_context, log_outcome};
use crate::output;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user
    Create {
        /// Username to create
        username: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: UserCommands, logger: &Option<LoggingService>) -> Result<()> {
    match command {
        UserCommands::Create { username, json } => {
            let ctx = get_context(None)?;

            let form = UserForm { username };
            let pb = output::spinner("Creating user...");
            let result = ctx.payment_service.create_user(&form);
            pb.finish_and_clear();

            log_outcome(logger, "user create", Action::CreateUser, result.as_ref().err());
            finish(json, result, |msg| output::success(msg))
        }
    }
}
