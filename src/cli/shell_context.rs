use crate::{config::ConfigManager, session::AppSession};

use super::commands::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub session: AppSession,
    pub config_manager: ConfigManager,
    pub last_command: Option<String>,
    pub running: bool,
}
