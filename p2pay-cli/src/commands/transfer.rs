//! Transfer command - send funds and show the refreshed feed

use anyhow::Result;
use p2pay_core::{Action, FeedEntry, LoggingService, TransferForm};
use serde::Serialize;

use super::{finish, get_context, log_outcome};
use crate::output;

/// JSON shape of a successful transfer
#[derive(Serialize)]
struct TransferOutput {
    message: String,
    feed: Option<Vec<FeedEntry>>,
}

pub fn run(
    form: TransferForm,
    token: Option<String>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context(token)?;

    let pb = output::spinner("Sending transfer...");
    let result = ctx.payment_service.transfer(&form);
    pb.finish_and_clear();
    log_outcome(logger, "transfer", Action::Transfer, result.as_ref().err());

    // The transfer already went through; a failed refresh only costs the feed
    let result = result.map(|message| {
        let feed = match ctx.payment_service.feed() {
            Ok(feed) => {
                log_outcome(logger, "transfer", Action::RefreshFeed, None);
                Some(feed)
            }
            Err(e) => {
                log_outcome(logger, "transfer", Action::RefreshFeed, Some(&e));
                if !json {
                    output::warning(&format!("Failed to load feed: {}", e));
                }
                None
            }
        };
        TransferOutput { message, feed }
    });

    finish(json, result, |out| {
        output::success(&out.message);
        if let Some(feed) = &out.feed {
            println!();
            output::print_feed(feed);
        }
    })
}
