use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, section as output_section, OutputPreferences};

use super::CommandDefinition;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "View and change client settings",
        "config [show|set <key> <value>|path]",
        cmd_config,
    )
    .with_actions(&["show", "set", "path"])]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    crate::config::Config::keys().join("|")
                )));
            }
            let value = args[2..].join(" ");
            set_config_value(context, args[1], value.trim())
        }
        "path" => {
            io::print_info(context.config_manager.path().display());
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}` (expected show, set or path)",
            other
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    output_section("Configuration");
    for (key, value) in context.session.config().display_entries() {
        io::print_info(format!("  {:<22} {}", key, value));
    }
    Ok(())
}

/// Persists the stored settings; environment overrides stay in effect for
/// the running session only.
fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut stored = context.config_manager.load()?;
    stored.set(key, value)?;
    context.config_manager.save(&stored)?;

    let effective = stored.with_env_overrides();
    output::set_preferences(OutputPreferences {
        plain_mode: context.mode == crate::cli::core::CliMode::Script || !effective.ui_color_enabled,
        quiet_mode: false,
    });
    context.session.apply_config(effective)?;
    tracing::info!(key, "setting updated");
    io::print_success(format!("Updated `{}`.", key));
    Ok(())
}
