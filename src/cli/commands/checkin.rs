use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::checkin::CheckInDesk;
use crate::domain::{CheckOutcome, InvitationDetails};
use crate::session::Permission;

use super::{required_arg, CommandDefinition};

const USAGE: &str = "checkin <7-digit-code> | checkin --qr <payload>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "checkin",
        "Check a guest in with a typed or scanned ticket code",
        USAGE,
        cmd_checkin,
    )
    .with_actions(&["--qr"])]
}

fn cmd_checkin(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require(Permission::CheckIn)?;
    let first = required_arg(args, 0, USAGE)?;
    let desk = CheckInDesk::new(context.session.client());
    let outcome = if first == "--qr" {
        desk.check_scanned(required_arg(args, 1, USAGE)?)?
    } else {
        desk.check_manual(first)?
    };
    report(&outcome);
    Ok(())
}

fn describe(details: &InvitationDetails) -> String {
    let guest = details.guest_name.as_deref().unwrap_or("Guest");
    match (&details.ticket_type, &details.event_name) {
        (Some(ticket), Some(event)) => format!("{guest} ({ticket}) for {event}"),
        (None, Some(event)) => format!("{guest} for {event}"),
        (Some(ticket), None) => format!("{guest} ({ticket})"),
        (None, None) => guest.to_string(),
    }
}

fn report(outcome: &CheckOutcome) {
    match outcome {
        CheckOutcome::Admitted(details) => io::print_success(format!("Admitted: {}", describe(details))),
        CheckOutcome::AlreadyUsed(details) => {
            let when = details
                .checked_in_at
                .as_deref()
                .map(|at| format!(" at {at}"))
                .unwrap_or_default();
            io::print_warning(format!(
                "Ticket already used{when}: {}",
                describe(details)
            ));
        }
        CheckOutcome::Rejected { message } => io::print_error(message),
    }
}
