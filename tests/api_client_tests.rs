mod common;

use std::sync::Arc;

use common::{client, ok, status, ticket_json, RecordingTransport};
use eventdesk::api::{ApiError, ApiRequest, ApiResponse, Method, Transport};
use eventdesk::config::Config;
use eventdesk::domain::{
    BookingDecision, BookingStatus, EventStatus, FileRef, Role, TicketStatus,
};
use eventdesk::errors::EventDeskError;
use eventdesk::session::AppSession;
use serde_json::json;

/// Lets a test keep a handle on the transport it hands to a session.
struct Shared(Arc<RecordingTransport>);

impl Transport for Shared {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.0.send(request)
    }
}

fn session_with(role: Role, responses: Vec<ApiResponse>) -> (AppSession, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::with_responses(responses));
    let config = Config {
        role,
        ..Config::default()
    };
    let session = AppSession::with_transport(config, Box::new(Shared(Arc::clone(&transport))));
    (session, transport)
}

fn event_with_ticket(status: &str) -> ApiResponse {
    ok(json!({
        "_id": "evt1",
        "name": "Summer Gala",
        "status": "published",
        "venue": {"_id": "v1", "name": "Main Hall"},
        "tickets": [ticket_json("t1", "VIP", status)]
    }))
}

#[test]
fn get_event_unwraps_the_envelope() {
    let api = client([event_with_ticket("active")]);
    let event = api.get_event("evt1").unwrap();

    assert_eq!(event.name, "Summer Gala");
    assert_eq!(event.status, EventStatus::Published);
    assert_eq!(event.tickets.len(), 1);
    assert_eq!(event.tickets[0].remaining(), 7);

    let requests = api.transport().requests();
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[0].path, "/events/evt1");
}

#[test]
fn success_false_envelope_is_an_error() {
    let api = client([status(200, json!({"success": false, "message": "Event is locked"}))]);
    let err = api.get_event("evt1").unwrap_err();
    assert_eq!(err.server_message(), Some("Event is locked"));
}

#[test]
fn ids_that_would_change_the_route_are_refused() {
    let api = client([]);
    let err = api.get_event("../admin").unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(api.update_ticket_status("evt1", "", TicketStatus::Active).is_err());
    assert_eq!(api.transport().request_count(), 0);
}

#[test]
fn ticket_status_is_patched_on_the_ticket_route() {
    let api = client([ok(ticket_json("t1", "VIP", "expired"))]);
    let ticket = api
        .update_ticket_status("evt1", "t1", TicketStatus::Expired)
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Expired);

    let request = &api.transport().requests()[0];
    assert_eq!(request.method, Method::Patch);
    assert_eq!(request.path, "/events/evt1/tickets/t1");
    assert_eq!(request.body.as_json().unwrap(), &json!({"status": "expired"}));
}

#[test]
fn session_publishes_a_draft_ticket() {
    let (session, transport) = session_with(
        Role::Organizer,
        vec![event_with_ticket("draft"), ok(ticket_json("t1", "VIP", "active"))],
    );

    let ticket = session
        .transition_ticket("evt1", "t1", TicketStatus::Active)
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Active);
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].path, "/events/evt1/tickets/t1");
}

#[test]
fn invalid_transition_sends_no_update() {
    let (session, transport) = session_with(Role::Organizer, vec![event_with_ticket("expired")]);

    let err = session
        .transition_ticket("evt1", "t1", TicketStatus::Active)
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot move ticket from expired to active");
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn unknown_ticket_is_not_found() {
    let (session, _transport) = session_with(Role::Organizer, vec![event_with_ticket("draft")]);
    let err = session
        .transition_ticket("evt1", "t404", TicketStatus::Active)
        .unwrap_err();
    assert!(matches!(err, EventDeskError::NotFound(_)));
}

#[test]
fn venue_managers_cannot_change_tickets() {
    let (session, transport) = session_with(Role::VenueManager, vec![]);
    let err = session
        .transition_ticket("evt1", "t1", TicketStatus::Active)
        .unwrap_err();
    assert!(matches!(err, EventDeskError::NotPermitted { .. }));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn booking_rejection_carries_the_reason() {
    let api = client([ok(json!({"_id": "b1", "status": "rejected"}))]);
    let booking = api
        .decide_booking("b1", BookingDecision::Reject, Some("  Double booked "))
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Rejected);

    let request = &api.transport().requests()[0];
    assert_eq!(request.path, "/bookings/b1/status");
    assert_eq!(
        request.body.as_json().unwrap(),
        &json!({"status": "rejected", "reason": "Double booked"})
    );
}

#[test]
fn organization_logo_goes_out_as_multipart() {
    let api = client([ok(json!({"_id": "org1", "name": "Acme", "logo": "/uploads/logo.png"}))]);
    let logo = FileRef::new("logo.png", vec![0x89, 0x50, 0x4e, 0x47]);

    let organization = api.update_organization_logo("org1", logo).unwrap();
    assert_eq!(organization.logo_url.as_deref(), Some("/uploads/logo.png"));

    let request = &api.transport().requests()[0];
    assert_eq!(request.path, "/organizations/org1/logo");
    let form = request.body.as_multipart().unwrap();
    let file = form.file("logo").unwrap();
    assert_eq!(file.content_type, "image/png");
    assert_eq!(file.len(), 4);
}

#[test]
fn transport_failures_fall_back_to_the_caller_message() {
    let api = client([]);
    api.transport()
        .push_error(ApiError::Transport("connection refused".into()));
    let err = api.get_event("evt1").unwrap_err();
    assert_eq!(err.user_message("Failed to load event"), "Failed to load event");
}
