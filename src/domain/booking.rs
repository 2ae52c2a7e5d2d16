use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Draft,
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStatus::Draft => "draft",
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Venue manager's answer to a pending booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingDecision {
    Approve,
    Reject,
}

impl BookingDecision {
    pub fn status(self) -> BookingStatus {
        match self {
            BookingDecision::Approve => BookingStatus::Approved,
            BookingDecision::Reject => BookingStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "venue")]
    pub venue_id: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default, with = "flexible_datetime")]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub expected_attendees: Option<u32>,
    #[serde(default)]
    pub guests: Vec<Guest>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub supporting_document_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Identifiable for Booking {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Booking {
    fn display_label(&self) -> String {
        let name = self.event_name.as_deref().unwrap_or("Untitled booking");
        match self.date {
            Some(date) => format!("{} on {} [{}]", name, date.format(DATE_FORMAT), self.status),
            None => format!("{} [{}]", name, self.status),
        }
    }
}
