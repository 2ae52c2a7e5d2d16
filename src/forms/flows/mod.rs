//! Concrete wizards: ticket creation, event setup and booking requests.

pub mod booking;
pub mod event;
pub mod ticket;

pub use booking::BookingFlow;
pub use event::EventSetupFlow;
pub use ticket::{TicketDescriptor, TicketFlow};

use chrono::NaiveDateTime;

use crate::domain::common::parse_datetime;
use crate::errors::{EventDeskError, Result};

const WIRE_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) fn wire_datetime(label: &str, raw: &str) -> Result<String> {
    parse_datetime(raw)
        .map(|value: NaiveDateTime| value.format(WIRE_DATETIME).to_string())
        .ok_or_else(|| EventDeskError::InvalidInput(format!("{label}: `{raw}` is not a date")))
}

pub(crate) fn parse_number<T: std::str::FromStr>(label: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| EventDeskError::InvalidInput(format!("{label}: `{raw}` is not a number")))
}

/// Trimmed text, `None` when blank.
pub(crate) fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
