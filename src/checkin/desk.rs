use crate::api::{ApiClient, Transport};
use crate::domain::CheckOutcome;
use crate::errors::Result;

use super::code::TicketCode;

/// Check-in station: validates codes locally, then asks the API once.
pub struct CheckInDesk<'a, T: Transport> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> CheckInDesk<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn check(&self, code: &TicketCode) -> Result<CheckOutcome> {
        Ok(self.client.check_invitation(code.as_str(), code.kind())?)
    }

    /// Rejects malformed manual codes before any request is made.
    pub fn check_manual(&self, raw: &str) -> Result<CheckOutcome> {
        let code = TicketCode::manual(raw)?;
        self.check(&code)
    }

    pub fn check_scanned(&self, payload: &str) -> Result<CheckOutcome> {
        let code = TicketCode::scanned(payload)?;
        self.check(&code)
    }
}
