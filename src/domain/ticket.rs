use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;
use crate::domain::discount::CategoryDiscount;
use crate::errors::{EventDeskError, Result};

/// Lifecycle of a ticket type: `Draft → Active → Expired`, plus withdrawing a
/// draft straight to `Expired`. `Expired` is terminal.
///
/// Decoding ignores case; any other status the server reports becomes
/// `Unknown`, which no transition leads to or from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TicketStatus {
    #[default]
    Draft,
    Active,
    Expired,
    Unknown,
}

impl From<String> for TicketStatus {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or(TicketStatus::Unknown)
    }
}

impl TicketStatus {
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Draft, TicketStatus::Active)
                | (TicketStatus::Draft, TicketStatus::Expired)
                | (TicketStatus::Active, TicketStatus::Expired)
        )
    }

    pub fn transition(self, next: TicketStatus) -> Result<TicketStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(EventDeskError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Status a freshly submitted ticket starts in.
    pub fn for_submission(draft: bool) -> TicketStatus {
        if draft {
            TicketStatus::Draft
        } else {
            TicketStatus::Active
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TicketStatus::Draft => "draft",
            TicketStatus::Active => "active",
            TicketStatus::Expired => "expired",
            TicketStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(TicketStatus::Draft),
            "active" => Ok(TicketStatus::Active),
            "expired" => Ok(TicketStatus::Expired),
            other => Err(format!("unknown ticket status `{}`", other)),
        }
    }
}

/// A ticket type as stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub sold: u32,
    #[serde(default)]
    pub max_per_person: Option<u32>,
    #[serde(default, with = "flexible_datetime")]
    pub sale_start_date: Option<NaiveDateTime>,
    #[serde(default, with = "flexible_datetime")]
    pub sale_end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_refundable: bool,
    #[serde(default)]
    pub refund_policy: Option<String>,
    #[serde(default)]
    pub category_discounts: Vec<CategoryDiscount>,
    #[serde(default)]
    pub status: TicketStatus,
}

impl TicketType {
    /// Stored status, with active tickets past their sale end reported as expired.
    pub fn effective_status(&self, now: NaiveDateTime) -> TicketStatus {
        match (self.status, self.sale_end_date) {
            (TicketStatus::Active, Some(end)) if end < now => TicketStatus::Expired,
            (status, _) => status,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.quantity.saturating_sub(self.sold)
    }
}

impl NamedEntity for TicketType {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for TicketType {
    fn display_label(&self) -> String {
        format!(
            "{} - {:.2} ({} of {} left, {})",
            self.name,
            self.price,
            self.remaining(),
            self.quantity,
            self.status
        )
    }
}
