//! Explicit application state handed to every command.

use chrono::Local;

use crate::api::{ApiClient, HttpTransport, Transport};
use crate::config::Config;
use crate::domain::{Role, TicketStatus, TicketType};
use crate::errors::{EventDeskError, Result};

/// Actions gated by the operator's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageTickets,
    EditEvents,
    RequestBookings,
    DecideBookings,
    ManageOrganization,
    CheckIn,
}

impl Permission {
    fn allowed(self, role: Role) -> bool {
        match self {
            Permission::ManageTickets | Permission::EditEvents | Permission::ManageOrganization => {
                role.can_manage_tickets()
            }
            Permission::RequestBookings => role.can_request_bookings(),
            Permission::DecideBookings => role.can_decide_bookings(),
            Permission::CheckIn => true,
        }
    }

    fn action(self) -> &'static str {
        match self {
            Permission::ManageTickets => "manage tickets",
            Permission::EditEvents => "edit events",
            Permission::RequestBookings => "request bookings",
            Permission::DecideBookings => "approve or reject bookings",
            Permission::ManageOrganization => "update organization documents",
            Permission::CheckIn => "check in guests",
        }
    }
}

pub struct AppSession {
    config: Config,
    client: ApiClient<Box<dyn Transport>>,
}

impl AppSession {
    /// Connects to the configured API over HTTP.
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Box::new(transport)))
    }

    pub fn with_transport(config: Config, transport: Box<dyn Transport>) -> Self {
        Self {
            config,
            client: ApiClient::new(transport),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &ApiClient<Box<dyn Transport>> {
        &self.client
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    /// Replaces the configuration, reconnecting when the endpoint changed.
    pub fn apply_config(&mut self, config: Config) -> Result<()> {
        let reconnect = config.api_base_url != self.config.api_base_url
            || config.api_token != self.config.api_token
            || config.request_timeout_secs != self.config.request_timeout_secs;
        if reconnect {
            self.client = ApiClient::new(Box::new(HttpTransport::new(&config)?));
        }
        self.config = config;
        Ok(())
    }

    pub fn require(&self, permission: Permission) -> Result<()> {
        if permission.allowed(self.role()) {
            Ok(())
        } else {
            Err(EventDeskError::NotPermitted {
                role: self.role().to_string(),
                action: permission.action().to_string(),
            })
        }
    }

    /// Moves a ticket type along its lifecycle after checking the move
    /// against the ticket's effective status.
    pub fn transition_ticket(
        &self,
        event_id: &str,
        ticket_id: &str,
        next: TicketStatus,
    ) -> Result<TicketType> {
        self.require(Permission::ManageTickets)?;
        let event = self.client.get_event(event_id)?;
        let ticket = event
            .tickets
            .iter()
            .find(|ticket| ticket.id.as_deref() == Some(ticket_id))
            .ok_or_else(|| EventDeskError::NotFound(format!("ticket `{ticket_id}`")))?;
        let current = ticket.effective_status(Local::now().naive_local());
        current.transition(next)?;
        let updated = self.client.update_ticket_status(event_id, ticket_id, next)?;
        tracing::info!(event_id, ticket_id, from = %current, to = %next, "ticket status changed");
        Ok(updated)
    }
}
