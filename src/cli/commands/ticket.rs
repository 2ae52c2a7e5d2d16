use std::str::FromStr;

use chrono::Local;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::interaction::run_wizard;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::domain::{Displayable, TicketStatus};
use crate::forms::flows::TicketFlow;
use crate::forms::Wizard;
use crate::session::Permission;

use super::{required_arg, CommandDefinition};

const USAGE: &str =
    "ticket [new <event-id>|list <event-id>|status <event-id> <ticket-id> <active|expired>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "ticket",
        "Create ticket types for an event and manage their status",
        USAGE,
        cmd_ticket,
    )
    .with_actions(&["new", "list", "status"])]
}

fn cmd_ticket(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = required_arg(args, 0, USAGE)?;
    match action.to_lowercase().as_str() {
        "new" => new_tickets(context, required_arg(args, 1, "ticket new <event-id>")?),
        "list" => list_tickets(context, required_arg(args, 1, "ticket list <event-id>")?),
        "status" => {
            let usage = "ticket status <event-id> <ticket-id> <active|expired>";
            let event_id = required_arg(args, 1, usage)?;
            let ticket_id = required_arg(args, 2, usage)?;
            let status =
                TicketStatus::from_str(required_arg(args, 3, usage)?).map_err(CommandError::InvalidArguments)?;
            let ticket = context.session.transition_ticket(event_id, ticket_id, status)?;
            io::print_success(format!("`{}` is now {}.", ticket.name, ticket.status));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown ticket action `{}` (expected new, list or status)",
            other
        ))),
    }
}

fn new_tickets(context: &mut ShellContext, event_id: &str) -> CommandResult {
    context.require(Permission::ManageTickets)?;
    let mut wizard = Wizard::new(TicketFlow::new(event_id));
    if let Some(tickets) = run_wizard(context, &mut wizard)? {
        for ticket in &tickets {
            io::print_info(format!("  {}", ticket.display_label()));
        }
    }
    Ok(())
}

fn list_tickets(context: &mut ShellContext, event_id: &str) -> CommandResult {
    let event = context.session.client().get_event(event_id)?;
    output_section(format!("Tickets for {}", event.name));
    if event.tickets.is_empty() {
        io::print_info("No ticket types yet. Use `ticket new <event-id>` to add some.");
        return Ok(());
    }
    let now = Local::now().naive_local();
    for ticket in &event.tickets {
        io::print_info(format!(
            "  {:<12} {:<24} {:>10.2}  {:>5} left  {}",
            ticket.id.as_deref().unwrap_or("-"),
            ticket.name,
            ticket.price,
            ticket.remaining(),
            ticket.effective_status(now)
        ));
    }
    Ok(())
}
