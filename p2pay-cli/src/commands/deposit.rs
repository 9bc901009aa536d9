//! Deposit command - add funds to a user

use anyhow::Result;
use p2pay_core::{Action, DepositForm, LoggingService};

use super::{finish, get_context, log_outcome};
use crate::output;

pub fn run(
    username: String,
    amount: String,
    token: Option<String>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context(token)?;

    let form = DepositForm { username, amount };
    let pb = output::spinner("Depositing...");
    let result = ctx.payment_service.deposit(&form);
    pb.finish_and_clear();

    log_outcome(logger, "deposit", Action::Deposit, result.as_ref().err());
    finish(json, result, |msg| output::success(msg))
}
