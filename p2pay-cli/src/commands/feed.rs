//! Feed command - show the activity feed

use anyhow::Result;
use colored::Colorize;
use p2pay_core::{Action, LoggingService};

use super::{finish, get_context, log_outcome};
use crate::output;

pub fn run(json: bool, logger: &Option<LoggingService>) -> Result<()> {
    let ctx = get_context(None)?;

    let pb = output::spinner("Loading feed...");
    let result = ctx.payment_service.feed();
    pb.finish_and_clear();

    log_outcome(logger, "feed", Action::RefreshFeed, result.as_ref().err());
    finish(json, result, |feed| {
        println!("{}", "Activity Feed".bold());
        println!();
        output::print_feed(feed);
    })
}
