use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;
use crate::domain::ticket::TicketType;

/// Publication state of an event as reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Draft,
    Published,
    Cancelled,
    Completed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
            EventStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Venue reference; the API returns either a bare id or a populated object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VenueRef {
    Id(String),
    Detail {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl VenueRef {
    pub fn id(&self) -> &str {
        match self {
            VenueRef::Id(id) => id,
            VenueRef::Detail { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub venue: Option<VenueRef>,
    #[serde(default, with = "flexible_datetime")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, with = "flexible_datetime")]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub tickets: Vec<TicketType>,
}

impl Identifiable for Event {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Event {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Event {
    fn display_label(&self) -> String {
        match self.start_date {
            Some(start) => format!("{} ({})", self.name, start.format(DATE_FORMAT)),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_populated_and_bare_venue_refs() {
        let bare: Event =
            serde_json::from_value(serde_json::json!({"_id": "e1", "name": "Gala", "venue": "v9"}))
                .unwrap();
        assert_eq!(bare.venue.unwrap().id(), "v9");

        let populated: Event = serde_json::from_value(serde_json::json!({
            "id": "e2",
            "name": "Expo",
            "venue": {"_id": "v3", "name": "Hall"},
            "status": "archived",
            "startDate": "2025-06-01T09:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(populated.venue.unwrap().id(), "v3");
        assert_eq!(populated.status, EventStatus::Unknown);
        assert!(populated.start_date.is_some());
    }
}
