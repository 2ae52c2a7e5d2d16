pub mod commands;
pub mod core;
pub mod help;
pub mod interaction;
pub mod io;
pub mod output;
mod shell;
mod shell_context;

pub use shell::{run_cli, SCRIPT_ENV};
