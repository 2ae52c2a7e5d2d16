use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::interaction::run_wizard;
use crate::cli::io;
use crate::domain::{BookingDecision, Displayable};
use crate::forms::flows::BookingFlow;
use crate::forms::Wizard;
use crate::session::Permission;

use super::{required_arg, CommandDefinition};

const USAGE: &str = "booking [new [venue-id]|approve <booking-id>|reject <booking-id> [reason]]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "booking",
        "Request a venue booking or decide on a pending one",
        USAGE,
        cmd_booking,
    )
    .with_actions(&["new", "approve", "reject"])]
}

fn cmd_booking(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = required_arg(args, 0, USAGE)?;
    match action.to_lowercase().as_str() {
        "new" => new_booking(context, args.get(1).copied()),
        "approve" => {
            let booking_id = required_arg(args, 1, "booking approve <booking-id>")?;
            decide(context, booking_id, BookingDecision::Approve, None)
        }
        "reject" => {
            let booking_id = required_arg(args, 1, "booking reject <booking-id> [reason]")?;
            let reason = args[2..].join(" ");
            decide(context, booking_id, BookingDecision::Reject, Some(reason.as_str()))
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown booking action `{}` (expected new, approve or reject)",
            other
        ))),
    }
}

fn new_booking(context: &mut ShellContext, venue_id: Option<&str>) -> CommandResult {
    context.require(Permission::RequestBookings)?;
    let flow = match venue_id {
        Some(venue_id) => BookingFlow::for_venue(venue_id),
        None => BookingFlow::new(),
    };
    let mut wizard = Wizard::new(flow);
    if let Some(booking) = run_wizard(context, &mut wizard)? {
        io::print_info(format!("Booking {}: {}", booking.id, booking.display_label()));
    }
    Ok(())
}

fn decide(
    context: &mut ShellContext,
    booking_id: &str,
    decision: BookingDecision,
    reason: Option<&str>,
) -> CommandResult {
    context.require(Permission::DecideBookings)?;
    let booking = context
        .session
        .client()
        .decide_booking(booking_id, decision, reason)?;
    tracing::info!(booking_id, status = %booking.status, "booking decided");
    io::print_success(format!("Booking {} is now {}.", booking.id, booking.status));
    Ok(())
}
