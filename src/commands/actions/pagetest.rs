//! Pagination test command handler.
//!
//! Answers with a document far larger than a single page: a body of every
//! number below 1000 and two long fields.

use chrono::{DateTime, Utc};
use log::debug;

use crate::{commands::CommandResult, pagination::Document};

/// Builds the oversized test document.
pub fn handle_pagetest(user_id: &str) -> CommandResult {
    debug!("handling pagetest command");

    CommandResult::reply(build_test_document(user_id, Utc::now()))
}

fn build_test_document(user_id: &str, timestamp: DateTime<Utc>) -> Document {
    Document::new()
        .title("Every single natural number (1-999)")
        .body(join_range(1, 1000))
        .field("Field #1 (1000-1499)", join_range(1000, 1500), true)
        .field("Field #2 (2000-2500)", join_range(2000, 2500), true)
        .footer(format!("Tested by {}", user_id), None)
        .timestamp(timestamp)
}

/// Numbers from `start` to `end` excluded, separated by commas.
fn join_range(start: u32, end: u32) -> String {
    (start..end)
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
