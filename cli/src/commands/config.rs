//! User settings commands: `config get` and `config set`.

use command_engine_core::{
    CliContext, Command, CommandArgument, EngineError, OptionKind, OptionValue, Result,
};

use crate::settings::{self, SETTING_NAMES, UserSettings};

/// `config` router with `get` and `set` leaves.
pub fn config_command() -> Command {
    Command::new("config")
        .with_description("Manage user settings.")
        .with_child(
            Command::new("get")
                .with_usage("get [setting]")
                .with_description("Display user settings.")
                .with_argument(
                    CommandArgument::optional("setting", OptionKind::single_select(SETTING_NAMES))
                        .with_description("Setting to display"),
                )
                .with_handler(config_get),
        )
        .with_child(
            Command::new("set")
                .with_usage("set <setting> <value>")
                .with_description("Change a user setting.")
                .with_argument(
                    CommandArgument::required("setting", OptionKind::single_select(SETTING_NAMES))
                        .with_description("Setting to change"),
                )
                .with_argument(
                    CommandArgument::required("value", OptionKind::Text)
                        .with_description("New value"),
                )
                .with_handler(config_set),
        )
}

fn config_get(ctx: &mut CliContext) -> Result<()> {
    let loaded = UserSettings::load(&settings::settings_path())?;
    let name = ctx.argument(0).and_then(OptionValue::as_text);
    let value = loaded.get(name)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn config_set(ctx: &mut CliContext) -> Result<()> {
    let name = required_argument(ctx, 0, "setting")?;
    let value = required_argument(ctx, 1, "value")?;

    let path = settings::settings_path();
    let mut loaded = UserSettings::load(&path)?;
    loaded.set(&name, &value)?;
    loaded.save(&path)?;
    println!("{name} = {value}");
    Ok(())
}

fn required_argument(ctx: &CliContext, index: usize, name: &str) -> Result<String> {
    ctx.argument(index)
        .and_then(OptionValue::as_text)
        .map(String::from)
        .ok_or_else(|| EngineError::input_validation(name, "a value is required"))
}
