mod common;

use common::{client, ok, status, ticket_json};
use eventdesk::api::Method;
use eventdesk::domain::FileRef;
use eventdesk::errors::EventDeskError;
use eventdesk::forms::flows::booking::GUESTS;
use eventdesk::forms::flows::ticket::TICKETS;
use eventdesk::forms::flows::{BookingFlow, TicketFlow};
use eventdesk::forms::{Intent, NoticeLevel, SubmitMode, Submitter, Wizard, WizardEvent};
use serde_json::{json, Value};

fn booking_at_final_step() -> Wizard<BookingFlow> {
    let mut wizard = Wizard::new(BookingFlow::for_venue("v1"));
    for (key, value) in [
        ("eventName", "Launch"),
        ("date", "2030-09-12"),
        ("startTime", "18:00"),
        ("endTime", "22:30"),
        ("expectedAttendees", "80"),
    ] {
        wizard.dispatch(Intent::set(key, value)).unwrap();
    }
    assert_eq!(wizard.dispatch(Intent::Next).unwrap(), WizardEvent::Advanced(2));
    wizard
        .dispatch(Intent::update(GUESTS, 0, "name", "Ada Lovelace"))
        .unwrap();
    wizard
        .dispatch(Intent::update(GUESTS, 0, "email", "ada@example.com"))
        .unwrap();
    assert_eq!(wizard.dispatch(Intent::Next).unwrap(), WizardEvent::Advanced(3));
    assert!(wizard.is_final_step());
    wizard
}

fn booking_json() -> Value {
    json!({"_id": "b1", "eventName": "Launch", "status": "pending"})
}

#[test]
fn booking_without_files_is_sent_as_json() {
    let api = client([ok(booking_json())]);
    let mut wizard = booking_at_final_step();
    let mut notices = Vec::new();

    let booking = Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Publish)
        .unwrap();
    assert_eq!(booking.id, "b1");

    let requests = api.transport().requests();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/bookings");
    let body = requests[0].body.as_json().expect("json body");
    assert_eq!(body["venueId"], "v1");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["expectedAttendees"], 80);
    assert_eq!(body["guests"][0]["name"], "Ada Lovelace");
    assert_eq!(body["guests"][0]["email"], "ada@example.com");
    assert!(body.get("notes").is_none());
}

#[test]
fn guest_photo_switches_the_body_to_multipart() {
    let api = client([ok(booking_json())]);
    let mut wizard = booking_at_final_step();
    wizard
        .dispatch(Intent::update(
            GUESTS,
            0,
            "photo",
            FileRef::new("ada.png", vec![0x89, 0x50, 0x4e, 0x47]),
        ))
        .unwrap();
    let mut notices = Vec::new();

    Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Draft)
        .unwrap();

    let requests = api.transport().requests();
    let form = requests[0].body.as_multipart().expect("multipart body");
    assert_eq!(form.text_value("status"), Some("draft"));
    assert_eq!(form.text_value("eventName"), Some("Launch"));
    assert_eq!(form.text_value("expectedAttendees"), Some("80"));
    let guests: Value = serde_json::from_str(form.text_value("guests").unwrap()).unwrap();
    assert_eq!(guests[0]["name"], "Ada Lovelace");
    let photo = form.file("guestPhoto_0").expect("guest photo part");
    assert_eq!(photo.file_name, "ada.png");
    assert_eq!(photo.content_type, "image/png");
    assert!(form.file("supportingDocument").is_none());
    assert_eq!(notices, vec![(NoticeLevel::Success, "Draft saved".to_string())]);
}

#[test]
fn submit_before_final_step_sends_nothing() {
    let api = client([]);
    let mut wizard = Wizard::new(BookingFlow::for_venue("v1"));
    let mut notices = Vec::new();

    let err = Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Publish)
        .unwrap_err();
    assert!(matches!(
        err,
        EventDeskError::NotAtFinalStep { current: 1, total: 3 }
    ));
    assert_eq!(api.transport().request_count(), 0);
    assert!(notices.is_empty());
}

#[test]
fn in_flight_submission_blocks_a_second_one() {
    let api = client([ok(booking_json())]);
    let mut wizard = booking_at_final_step();
    wizard.begin_submission().unwrap();
    let mut notices = Vec::new();

    let err = Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Publish)
        .unwrap_err();
    assert!(matches!(err, EventDeskError::SubmissionInFlight));
    assert_eq!(api.transport().request_count(), 0);
}

#[test]
fn succeeded_wizard_is_not_resubmitted() {
    let api = client([ok(booking_json()), ok(booking_json())]);
    let mut wizard = booking_at_final_step();
    let mut notices = Vec::new();
    let mut submitter = Submitter::new(&api, &mut notices);

    submitter.submit(&mut wizard, SubmitMode::Publish).unwrap();
    let err = submitter.submit(&mut wizard, SubmitMode::Publish).unwrap_err();
    assert!(matches!(err, EventDeskError::AlreadySubmitted));
    assert_eq!(api.transport().request_count(), 1);
}

#[test]
fn server_message_wins_and_a_retry_is_allowed() {
    let api = client([
        status(409, json!({"success": false, "message": "Venue is already booked"})),
        ok(booking_json()),
    ]);
    let mut wizard = booking_at_final_step();
    let mut notices = Vec::new();

    {
        let mut submitter = Submitter::new(&api, &mut notices);
        let err = submitter
            .submit(&mut wizard, SubmitMode::Publish)
            .unwrap_err();
        assert!(matches!(err, EventDeskError::Api(_)));
    }
    assert_eq!(wizard.submission().failure(), Some("Venue is already booked"));

    Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Publish)
        .unwrap();
    assert!(wizard.submission().succeeded().is_some());
    assert_eq!(
        notices,
        vec![
            (NoticeLevel::Error, "Venue is already booked".to_string()),
            (NoticeLevel::Success, "Saved successfully".to_string()),
        ]
    );
}

#[test]
fn unstructured_failure_falls_back_to_flow_message() {
    let api = client([status(502, json!("<html>bad gateway</html>"))]);
    let mut wizard = booking_at_final_step();
    let mut notices = Vec::new();

    Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Publish)
        .unwrap_err();
    assert_eq!(
        notices,
        vec![(NoticeLevel::Error, "Failed to submit booking request".to_string())]
    );
}

fn tickets_at_final_step() -> Wizard<TicketFlow> {
    let mut wizard = Wizard::new(TicketFlow::new("evt1"));
    for (field, value) in [
        ("name", "VIP"),
        ("description", "Front rows"),
        ("price", "50"),
        ("quantity", "10"),
        ("maxPerPerson", "2"),
        ("saleStartDate", "2030-01-01T09:00"),
        ("saleEndDate", "2030-02-01T09:00"),
    ] {
        wizard
            .dispatch(Intent::update(TICKETS, 0, field, value))
            .unwrap();
    }
    while !wizard.is_final_step() {
        assert!(matches!(
            wizard.dispatch(Intent::Next).unwrap(),
            WizardEvent::Advanced(_)
        ));
    }
    wizard
}

#[test]
fn earlier_step_edits_are_validated_on_submit() {
    let api = client([ok(json!([ticket_json("t1", "VIP", "active")]))]);
    let mut wizard = tickets_at_final_step();
    wizard
        .dispatch(Intent::update(TICKETS, 0, "price", "-5"))
        .unwrap();
    wizard
        .dispatch(Intent::update(TICKETS, 0, "name", ""))
        .unwrap();
    let mut notices = Vec::new();

    let err = Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Publish)
        .unwrap_err();
    match err {
        EventDeskError::Validation(errors) => {
            assert_eq!(errors["ticket-0-price"], "Price cannot be negative");
            assert_eq!(errors["ticket-0-name"], "Ticket name is required");
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
    assert_eq!(api.transport().request_count(), 0);
    assert!(notices.is_empty());
    assert_eq!(wizard.errors()["ticket-0-price"], "Price cannot be negative");
    assert!(wizard.submission().failure().is_none());

    wizard
        .dispatch(Intent::update(TICKETS, 0, "price", "40"))
        .unwrap();
    wizard
        .dispatch(Intent::update(TICKETS, 0, "name", "VIP"))
        .unwrap();
    Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Publish)
        .unwrap();
    let request = api.transport().requests()[0].clone();
    assert_eq!(request.path, "/events/evt1/tickets");
    let body = request.body.as_json().unwrap().clone();
    assert_eq!(body[0]["price"], 40.0);
}

#[test]
fn earlier_step_edits_block_drafts_too() {
    let api = client([]);
    let mut wizard = booking_at_final_step();
    wizard.dispatch(Intent::set("endTime", "17:00")).unwrap();
    let mut notices = Vec::new();

    let err = Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Draft)
        .unwrap_err();
    assert!(matches!(err, EventDeskError::Validation(ref errors) if errors.contains_key("endTime")));
    assert_eq!(api.transport().request_count(), 0);
}
