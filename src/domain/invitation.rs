use std::fmt;

use serde::{Deserialize, Serialize};

/// How the ticket code reached the check-in desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    Qr,
    Manual,
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeType::Qr => f.write_str("qr"),
            CodeType::Manual => f.write_str("manual"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Valid,
    Used,
    Expired,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDetails {
    #[serde(default)]
    pub ticket_code: Option<String>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub status: InvitationStatus,
    #[serde(default)]
    pub is_used: Option<bool>,
    #[serde(default)]
    pub checked_in_at: Option<String>,
}

impl InvitationDetails {
    pub fn already_used(&self) -> bool {
        self.status == InvitationStatus::Used || self.is_used.unwrap_or(false)
    }
}

/// Result of presenting a code at the door.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Admitted(InvitationDetails),
    AlreadyUsed(InvitationDetails),
    Rejected { message: String },
}
