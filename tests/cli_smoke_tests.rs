mod common;

use assert_cmd::Command;
use predicates::str::contains;
use regex::Regex;

use common::temp_home;

/// Runs the shell in script mode against an isolated data directory.
fn script(input: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("eventdesk")
        .unwrap()
        .env("EVENTDESK_CLI_SCRIPT", "1")
        .env("EVENTDESK_HOME", temp_home())
        .env("EVENTDESK_API_URL", "http://127.0.0.1:9/api")
        .env_remove("EVENTDESK_API_TOKEN")
        .write_stdin(input.to_string())
        .assert()
}

#[test]
fn help_lists_the_commands() {
    script("help\nexit\n")
        .success()
        .stdout(contains("=== Available commands ==="))
        .stdout(contains("checkin"))
        .stdout(contains("booking"));
}

#[test]
fn version_prints_the_package_version() {
    let output = script("version\n").success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    let pattern = Regex::new(r"=== eventdesk (\d+\.\d+\.\d+) ===").unwrap();
    let captures = pattern.captures(&stdout).expect("version banner");
    assert_eq!(&captures[1], env!("CARGO_PKG_VERSION"));
    assert!(stdout.contains("Build hash"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    script("tiket\n")
        .success()
        .stdout(contains("Unknown command `tiket`"))
        .stdout(contains("Suggestion: `ticket`?"));
}

#[test]
fn short_manual_code_is_refused_locally() {
    script("checkin 123\n")
        .success()
        .stdout(contains("Ticket code must be exactly 7 digits"));
}

#[test]
fn config_show_masks_nothing_when_no_token() {
    script("config show\n")
        .success()
        .stdout(contains("api_base_url"))
        .stdout(contains("http://127.0.0.1:9/api"))
        .stdout(contains("(none)"));
}

#[test]
fn role_change_gates_ticket_creation() {
    script("config set role venue_manager\nticket new evt1\n")
        .success()
        .stdout(contains("Updated `role`."))
        .stdout(contains("The venue_manager role cannot manage tickets"));
}

#[test]
fn cancelled_wizard_submits_nothing() {
    script("ticket new evt1\n:cancel\nexit\n")
        .success()
        .stdout(contains("Cancelled; nothing was submitted."));
}

#[test]
fn missing_arguments_show_usage() {
    script("booking reject\n")
        .success()
        .stdout(contains("usage:"))
        .stdout(contains("help <command>"));
}

#[test]
fn command_help_lists_actions() {
    script("help ticket\n")
        .success()
        .stdout(contains("=== Help: ticket ==="))
        .stdout(contains("Actions: new, list, status"));
}
