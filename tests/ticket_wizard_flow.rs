mod common;

use common::{client, ok, ticket_json};
use eventdesk::api::Method;
use eventdesk::forms::flows::ticket::TICKETS;
use eventdesk::forms::flows::TicketFlow;
use eventdesk::forms::{Intent, NoticeLevel, SubmitMode, Submitter, Wizard, WizardEvent};
use serde_json::json;

fn set(wizard: &mut Wizard<TicketFlow>, field: &str, value: &str) {
    wizard
        .dispatch(Intent::update(TICKETS, 0, field, value))
        .expect("update ticket field");
}

#[test]
fn ticket_wizard_walks_from_empty_form_to_created_tickets() {
    let mut wizard = Wizard::new(TicketFlow::new("evt1"));
    assert_eq!(wizard.step(), 1);

    assert!(matches!(
        wizard.dispatch(Intent::Next).unwrap(),
        WizardEvent::Blocked(_)
    ));
    assert_eq!(wizard.step(), 1);
    assert_eq!(wizard.errors()["ticket-0-name"], "Ticket name is required");

    set(&mut wizard, "name", "VIP");
    assert!(!wizard.errors().contains_key("ticket-0-name"));
    set(&mut wizard, "description", "Front rows and lounge");
    assert_eq!(wizard.dispatch(Intent::Next).unwrap(), WizardEvent::Advanced(2));

    set(&mut wizard, "price", "-5");
    assert!(matches!(
        wizard.dispatch(Intent::Next).unwrap(),
        WizardEvent::Blocked(_)
    ));
    assert_eq!(wizard.step(), 2);
    assert_eq!(wizard.errors()["ticket-0-price"], "Price cannot be negative");

    set(&mut wizard, "price", "50");
    set(&mut wizard, "quantity", "10");
    set(&mut wizard, "maxPerPerson", "2");
    set(&mut wizard, "saleStartDate", "2030-01-01T09:00");
    set(&mut wizard, "saleEndDate", "2030-02-01T09:00");
    assert_eq!(wizard.dispatch(Intent::Next).unwrap(), WizardEvent::Advanced(3));
    assert_eq!(wizard.dispatch(Intent::Next).unwrap(), WizardEvent::Advanced(4));
    assert!(wizard.is_final_step());

    let api = client([ok(json!([ticket_json("t1", "VIP", "active")]))]);
    let mut notices = Vec::new();
    let created = Submitter::new(&api, &mut notices)
        .submit(&mut wizard, SubmitMode::Publish)
        .expect("submission succeeds");

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "VIP");
    assert_eq!(notices, vec![(NoticeLevel::Success, "Saved successfully".to_string())]);

    let requests = api.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/events/evt1/tickets");
    let body = requests[0].body.as_json().expect("json body");
    let descriptors = body.as_array().expect("array of descriptors");
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0]["name"], "VIP");
    assert_eq!(descriptors[0]["price"], 50.0);
    assert_eq!(descriptors[0]["quantity"], 10);
    assert_eq!(descriptors[0]["maxPerPerson"], 2);
    assert_eq!(descriptors[0]["status"], "active");
    assert_eq!(descriptors[0]["categoryDiscounts"], json!([]));
}

#[test]
fn second_ticket_type_is_validated_separately() {
    let mut wizard = Wizard::new(TicketFlow::new("evt1"));
    set(&mut wizard, "name", "General");
    set(&mut wizard, "description", "Standing");
    wizard
        .dispatch(Intent::AddItem {
            list: TICKETS.to_string(),
        })
        .unwrap();

    assert_eq!(wizard.dispatch(Intent::Next).unwrap(), WizardEvent::Blocked(2));
    assert!(wizard.errors().contains_key("ticket-1-name"));
    assert!(wizard.errors().contains_key("ticket-1-description"));
    assert!(!wizard.errors().contains_key("ticket-0-name"));
}

#[test]
fn only_ticket_type_cannot_be_removed() {
    let mut wizard = Wizard::new(TicketFlow::new("evt1"));
    let err = wizard
        .dispatch(Intent::RemoveItem {
            list: TICKETS.to_string(),
            index: 0,
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "At least 1 ticket type required");
    assert_eq!(wizard.state().list(TICKETS).len(), 1);
}

#[test]
fn going_back_keeps_entered_values() {
    let mut wizard = Wizard::new(TicketFlow::new("evt1"));
    set(&mut wizard, "name", "General");
    set(&mut wizard, "description", "Standing");
    wizard.dispatch(Intent::Next).unwrap();
    set(&mut wizard, "price", "abc");

    assert_eq!(wizard.dispatch(Intent::Prev).unwrap(), WizardEvent::SteppedBack(1));
    assert!(wizard.errors().is_empty());
    let item = &wizard.state().list(TICKETS)[0];
    assert_eq!(item["name"].as_text(), Some("General"));
    assert_eq!(item["price"].as_text(), Some("abc"));
}
