//! Dialoguer-backed prompt provider.
//!
//! Maps the engine's prompt shapes onto dialoguer widgets. Escape and
//! interrupt both surface as cancellation, which the pipeline turns into a
//! cancellation outcome.

use command_engine::prompt::{PromptError, PromptProvider, PromptRequest, PromptShape};
use command_engine_core::OptionValue;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};

/// Interactive prompts on the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompter;

impl PromptProvider for DialoguerPrompter {
    fn prompt(&self, request: &PromptRequest) -> Result<OptionValue, PromptError> {
        let theme = ColorfulTheme::default();

        match &request.shape {
            PromptShape::FreeText => {
                let mut input = Input::<String>::with_theme(&theme).with_prompt(&request.message);
                if let Some(OptionValue::Text(default)) = &request.default {
                    input = input.default(default.clone());
                }
                let value = input.interact_text().map_err(map_error)?;
                Ok(OptionValue::Text(value))
            }
            PromptShape::Confirm => {
                let mut confirm = Confirm::with_theme(&theme).with_prompt(&request.message);
                if let Some(OptionValue::Flag(default)) = &request.default {
                    confirm = confirm.default(*default);
                }
                match confirm.interact_opt().map_err(map_error)? {
                    Some(answer) => Ok(OptionValue::Flag(answer)),
                    None => Err(PromptError::Cancelled),
                }
            }
            PromptShape::Select { choices } => {
                let mut select = Select::with_theme(&theme)
                    .with_prompt(&request.message)
                    .items(choices);
                if let Some(OptionValue::Text(default)) = &request.default {
                    if let Some(position) = choices.iter().position(|c| c == default) {
                        select = select.default(position);
                    }
                }
                match select.interact_opt().map_err(map_error)? {
                    Some(index) => Ok(OptionValue::Text(choices[index].clone())),
                    None => Err(PromptError::Cancelled),
                }
            }
            PromptShape::MultiSelect { choices } => {
                let picks = MultiSelect::with_theme(&theme)
                    .with_prompt(&request.message)
                    .items(choices)
                    .interact_opt()
                    .map_err(map_error)?;
                match picks {
                    Some(indexes) => Ok(OptionValue::List(
                        indexes.into_iter().map(|i| choices[i].clone()).collect(),
                    )),
                    None => Err(PromptError::Cancelled),
                }
            }
        }
    }
}

fn map_error(error: dialoguer::Error) -> PromptError {
    match &error {
        dialoguer::Error::IO(inner) if inner.kind() == std::io::ErrorKind::Interrupted => {
            PromptError::Cancelled
        }
        _ => PromptError::Failed(error.to_string()),
    }
}
