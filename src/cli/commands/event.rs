use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::interaction::run_wizard;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::domain::common::DATETIME_FORMAT;
use crate::domain::Displayable;
use crate::forms::flows::EventSetupFlow;
use crate::forms::Wizard;
use crate::session::Permission;

use super::{required_arg, CommandDefinition};

const USAGE: &str = "event [show <event-id>|edit <event-id>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "event",
        "Show an event or edit its details, schedule and photo",
        USAGE,
        cmd_event,
    )
    .with_actions(&["show", "edit"])]
}

fn cmd_event(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = required_arg(args, 0, USAGE)?;
    match action.to_lowercase().as_str() {
        "show" => show_event(context, required_arg(args, 1, "event show <event-id>")?),
        "edit" => edit_event(context, required_arg(args, 1, "event edit <event-id>")?),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown event action `{}` (expected show or edit)",
            other
        ))),
    }
}

fn show_event(context: &mut ShellContext, event_id: &str) -> CommandResult {
    let event = context.session.client().get_event(event_id)?;
    let date = |value: Option<chrono::NaiveDateTime>| {
        value
            .map(|value| value.format(DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| "(not set)".into())
    };

    output_section(event.display_label());
    io::print_info(format!("  Status      : {}", event.status));
    if let Some(category) = &event.category {
        io::print_info(format!("  Category    : {}", category));
    }
    if let Some(venue) = &event.venue {
        io::print_info(format!("  Venue       : {}", venue.id()));
    }
    io::print_info(format!("  Starts      : {}", date(event.start_date)));
    io::print_info(format!("  Ends        : {}", date(event.end_date)));
    if let Some(capacity) = event.capacity {
        io::print_info(format!("  Capacity    : {}", capacity));
    }
    io::print_info(format!("  Ticket types: {}", event.tickets.len()));
    Ok(())
}

fn edit_event(context: &mut ShellContext, event_id: &str) -> CommandResult {
    context.require(Permission::EditEvents)?;
    let event = context.session.client().get_event(event_id)?;
    let mut wizard = Wizard::new(EventSetupFlow::from_event(event));
    if let Some(event) = run_wizard(context, &mut wizard)? {
        io::print_info(format!("Event `{}` is now {}.", event.name, event.status));
    }
    Ok(())
}
