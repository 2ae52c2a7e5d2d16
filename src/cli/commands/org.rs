use std::path::Path;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::domain::FileRef;
use crate::session::Permission;

use super::{required_arg, CommandDefinition};

const USAGE: &str = "org [logo <path>|document <path>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "org",
        "Upload the organization logo or supporting document",
        USAGE,
        cmd_org,
    )
    .with_actions(&["logo", "document"])]
}

fn cmd_org(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = required_arg(args, 0, USAGE)?.to_lowercase();
    if !matches!(action.as_str(), "logo" | "document") {
        return Err(CommandError::InvalidArguments(format!(
            "unknown org action `{}` (expected logo or document)",
            action
        )));
    }
    let path = required_arg(args, 1, USAGE)?;
    context.require(Permission::ManageOrganization)?;
    let organization_id = context
        .session
        .config()
        .organization_id
        .clone()
        .ok_or_else(|| {
            CommandError::InvalidArguments(
                "organization_id is not set; use `config set organization_id <id>`".into(),
            )
        })?;
    let file = FileRef::from_path(Path::new(path))?;
    let client = context.session.client();

    let organization = if action == "logo" {
        client.update_organization_logo(&organization_id, file)?
    } else {
        client.update_supporting_document(&organization_id, file)?
    };
    tracing::info!(organization_id = %organization.id, action = %action, "organization updated");
    io::print_success(format!("Updated {} for {}.", action, organization.name));
    Ok(())
}
