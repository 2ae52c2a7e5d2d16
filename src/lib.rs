#![doc(test(attr(deny(warnings))))]

//! eventdesk is the client core behind the event organizer, venue manager and
//! administrator workflows: multi-step ticket, event and booking wizards,
//! their submission to the remote API, and invitation check-in.

pub mod api;
pub mod checkin;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod forms;
pub mod session;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("eventdesk tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
