//! Canonical structured field keys and value-format helpers.

use crate::frame::InputId;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const WORKER_ID: &str = "worker_id";
pub const INPUT: &str = "input";
pub const SELECTED: &str = "selected";
pub const DESTINATION: &str = "destination";
pub const PAYLOAD_LEN: &str = "payload_len";
pub const SKIPPED: &str = "skipped";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_BROADCAST_CLOSED: &str = "broadcast_closed";
pub const REASON_NOT_SELECTED: &str = "not_selected";

pub fn format_optional_input(input: Option<&InputId>) -> String {
    input
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| NONE.to_string())
}
