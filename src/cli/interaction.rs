//! Terminal and scripted front-ends for the form engine.

use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::forms::{
    ConfirmationResponse, ErrorMap, FieldKind, FormEngine, FormInteraction, FormResult,
    NoticeLevel, Notifier, PromptContext, PromptResponse, Submitter, Wizard, WizardFlow,
};

use super::core::{CliMode, CommandError, ShellContext};
use super::io::{self, read_script_line};
use super::output;

const BACK_OPTION: &str = "← Back";

/// Maps typed answers onto engine responses. Keywords need a leading colon so
/// they never shadow real values.
fn interpret_answer(buffer: &str) -> PromptResponse {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return PromptResponse::Keep;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        ":cancel" => PromptResponse::Cancel,
        ":back" => PromptResponse::Back,
        ":help" => PromptResponse::Help,
        ":clear" => PromptResponse::Value(String::new()),
        _ => PromptResponse::Value(trimmed.to_string()),
    }
}

fn interpret_confirmation(buffer: &str) -> Option<ConfirmationResponse> {
    match buffer.trim().to_ascii_lowercase().as_str() {
        "" | "publish" | "submit" | "yes" | "y" => Some(ConfirmationResponse::Publish),
        "draft" | "save draft" => Some(ConfirmationResponse::SaveDraft),
        "back" | ":back" => Some(ConfirmationResponse::Back),
        "cancel" | ":cancel" | "no" | "n" => Some(ConfirmationResponse::Cancel),
        _ => None,
    }
}

fn prompt_label(context: &PromptContext<'_>) -> String {
    match context.default.as_deref() {
        Some(default) => format!("{} [{}]", context.label, default),
        None if !context.descriptor.required => format!("{} (optional)", context.label),
        None => context.label.to_string(),
    }
}

fn print_errors(errors: &ErrorMap) {
    for (field, message) in errors {
        output::error(format!("{field}: {message}"));
    }
}

/// Prompts through dialoguer, one header per step.
pub struct WizardInteraction {
    theme: ColorfulTheme,
    shown_step: Option<usize>,
}

impl Default for WizardInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            shown_step: None,
        }
    }

    fn print_step_header(&mut self, context: &PromptContext<'_>) {
        if self.shown_step != Some(context.step) {
            output::section(format!(
                "Step {} of {}: {}",
                context.step, context.total_steps, context.step_title
            ));
            self.shown_step = Some(context.step);
        }
        if let Some(error) = &context.error {
            output::error(error);
        }
    }

    fn prompt_text(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        match Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt_label(context))
            .allow_empty(true)
            .interact_text()
        {
            Ok(buffer) => interpret_answer(&buffer),
            Err(_) => PromptResponse::Cancel,
        }
    }

    fn prompt_select(
        &mut self,
        context: &PromptContext<'_>,
        options: &[String],
        default: Option<usize>,
    ) -> PromptResponse {
        let mut items: Vec<&str> = options.iter().map(String::as_str).collect();
        items.push(BACK_OPTION);
        let selection = Select::with_theme(&self.theme)
            .with_prompt(context.label.as_ref())
            .items(&items)
            .default(default.unwrap_or(0))
            .interact_opt();
        match selection {
            Ok(Some(index)) if index == options.len() => PromptResponse::Back,
            Ok(Some(index)) if Some(index) == default => PromptResponse::Keep,
            Ok(Some(index)) => PromptResponse::Value(options[index].clone()),
            Ok(None) | Err(_) => PromptResponse::Cancel,
        }
    }

    fn prompt_boolean(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        let options = vec!["Yes".to_string(), "No".to_string()];
        let default = context
            .default
            .as_deref()
            .map(|value| match value.to_ascii_lowercase().as_str() {
                "true" | "yes" => 0,
                _ => 1,
            });
        match self.prompt_select(context, &options, default) {
            PromptResponse::Value(choice) => PromptResponse::Value(choice.to_ascii_lowercase()),
            other => other,
        }
    }
}

impl FormInteraction for WizardInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        self.print_step_header(context);
        match &context.descriptor.kind {
            FieldKind::Choice(options) => {
                let default = context
                    .default
                    .as_deref()
                    .and_then(|value| options.iter().position(|option| option == value));
                self.prompt_select(context, options, default)
            }
            FieldKind::Boolean => self.prompt_boolean(context),
            _ => self.prompt_text(context),
        }
    }

    fn confirm(&mut self, summary: &[String]) -> ConfirmationResponse {
        for line in summary {
            println!("{line}");
        }
        let options = ["Publish", "Save as draft", BACK_OPTION, "Cancel"];
        match Select::with_theme(&self.theme)
            .with_prompt("Submit now?")
            .items(&options)
            .default(0)
            .interact_opt()
        {
            Ok(Some(0)) => ConfirmationResponse::Publish,
            Ok(Some(1)) => ConfirmationResponse::SaveDraft,
            Ok(Some(2)) => ConfirmationResponse::Back,
            _ => ConfirmationResponse::Cancel,
        }
    }

    fn show_errors(&mut self, errors: &ErrorMap) {
        print_errors(errors);
    }

    fn show_notice(&mut self, message: &str) {
        output::warning(message);
    }
}

/// Reads wizard answers line by line from stdin. End of input cancels.
#[derive(Default)]
pub struct ScriptInteraction;

impl ScriptInteraction {
    pub fn new() -> Self {
        Self
    }

    fn read(&mut self) -> Option<String> {
        match read_script_line() {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "could not read scripted answer");
                None
            }
        }
    }
}

impl FormInteraction for ScriptInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        output::prompt(prompt_label(context));
        match self.read() {
            Some(line) => interpret_answer(&line),
            None => PromptResponse::Cancel,
        }
    }

    fn confirm(&mut self, summary: &[String]) -> ConfirmationResponse {
        for line in summary {
            io::print_info(line);
        }
        loop {
            output::prompt("Submit now? [publish/draft/back/cancel]");
            let Some(line) = self.read() else {
                return ConfirmationResponse::Cancel;
            };
            match interpret_confirmation(&line) {
                Some(response) => return response,
                None => io::print_warning(format!("Unknown choice `{}`.", line.trim())),
            }
        }
    }

    fn show_errors(&mut self, errors: &ErrorMap) {
        print_errors(errors);
    }

    fn show_notice(&mut self, message: &str) {
        io::print_warning(message);
    }
}

/// Routes submission notices to the shell output.
pub struct ShellNotifier;

impl Notifier for ShellNotifier {
    fn notify(&mut self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => io::print_success(message),
            NoticeLevel::Error => io::print_error(message),
        }
    }
}

/// Runs a wizard to completion and submits it. `Ok(None)` means the user
/// cancelled or the failure was already reported through the notifier.
pub(crate) fn run_wizard<F: WizardFlow>(
    context: &mut ShellContext,
    wizard: &mut Wizard<F>,
) -> Result<Option<F::Entity>, CommandError> {
    let outcome = match context.mode {
        CliMode::Interactive => FormEngine::new(wizard).run(&mut WizardInteraction::new())?,
        CliMode::Script => FormEngine::new(wizard).run(&mut ScriptInteraction::new())?,
    };
    let mode = match outcome {
        FormResult::Completed(mode) => mode,
        FormResult::Cancelled => {
            io::print_warning("Cancelled; nothing was submitted.");
            return Ok(None);
        }
    };

    let mut notifier = ShellNotifier;
    match Submitter::new(context.session.client(), &mut notifier).submit(wizard, mode) {
        Ok(entity) => Ok(Some(entity)),
        Err(_) if wizard.submission().failure().is_some() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_keep_the_current_value() {
        assert_eq!(interpret_answer("   "), PromptResponse::Keep);
        assert_eq!(interpret_answer(" 42 "), PromptResponse::Value("42".into()));
    }

    #[test]
    fn colon_keywords_control_navigation() {
        assert_eq!(interpret_answer(":back"), PromptResponse::Back);
        assert_eq!(interpret_answer(":CANCEL"), PromptResponse::Cancel);
        assert_eq!(interpret_answer(":help"), PromptResponse::Help);
        assert_eq!(interpret_answer(":clear"), PromptResponse::Value(String::new()));
        assert_eq!(interpret_answer("back"), PromptResponse::Value("back".into()));
    }

    #[test]
    fn confirmation_words_map_to_modes() {
        assert_eq!(interpret_confirmation(""), Some(ConfirmationResponse::Publish));
        assert_eq!(interpret_confirmation("Draft"), Some(ConfirmationResponse::SaveDraft));
        assert_eq!(interpret_confirmation("back"), Some(ConfirmationResponse::Back));
        assert_eq!(interpret_confirmation("cancel"), Some(ConfirmationResponse::Cancel));
        assert_eq!(interpret_confirmation("maybe"), None);
    }
}
