//! Project and sample scaffolding commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use command_engine::instrument;
use command_engine::telemetry::TelemetrySink;
use command_engine_core::{
    CliContext, Command, CommandArgument, CommandOption, EngineError, OptionKind, OptionValue,
    Result,
};
use serde_json::json;
use tracing::debug;

/// Capabilities a new project can be created with.
const CAPABILITIES: &[&str] = &["tab", "bot", "message-extension", "dashboard"];

/// Optional features wired into a new project.
const FEATURES: &[&str] = &["sso", "ci", "unit-tests"];

/// Sample templates: name and short description.
const SAMPLES: &[(&str, &str)] = &[
    ("hello-world", "Minimal single-page tab app"),
    ("notification", "Bot that pushes scheduled notifications"),
    ("dashboard", "Data dashboard with widget layout"),
];

/// `new` — create a project; `new template <template-name>` — create one
/// from a sample.
pub fn new_command(telemetry: Arc<dyn TelemetrySink>) -> Command {
    let sink = telemetry.clone();
    Command::new("new")
        .with_description("Create a new project.")
        .with_option(
            CommandOption::single_select("capability", CAPABILITIES)
                .with_shortcut("c")
                .with_description("Project capability")
                .require(),
        )
        .with_option(
            CommandOption::text("app-name")
                .with_shortcut("n")
                .with_description("Application name")
                .require(),
        )
        .with_option(
            CommandOption::text("folder")
                .with_shortcut("f")
                .with_description("Destination folder")
                .with_default(OptionValue::Text(".".to_string())),
        )
        .with_option(
            CommandOption::multi_select("features", FEATURES)
                .with_description("Extra features to include"),
        )
        .with_handler(move |ctx| create_project(ctx, sink.as_ref()))
        .with_child(template_command(telemetry))
}

fn template_command(telemetry: Arc<dyn TelemetrySink>) -> Command {
    let names: Vec<&str> = SAMPLES.iter().map(|(name, _)| *name).collect();
    Command::new("template")
        .with_usage("template <template-name>")
        .with_description("Create a new project from a sample.")
        .with_argument(
            CommandArgument::required("template-name", OptionKind::single_select(&names))
                .with_description("Sample to scaffold"),
        )
        .with_handler(move |ctx| create_sample(ctx, telemetry.as_ref()))
}

fn create_project(ctx: &mut CliContext, telemetry: &dyn TelemetrySink) -> Result<()> {
    let capability = required_text(ctx, "capability")?;
    let app_name = required_text(ctx, "app-name")?;
    let folder = ctx.text_option("folder").unwrap_or(".").to_string();
    let features: Vec<String> = ctx.list_option("features").unwrap_or_default().to_vec();

    ctx.set_telemetry_property("capability", capability.clone());

    let project_dir = instrument(telemetry, "generator", "scaffold", || {
        scaffold_project(Path::new(&folder), &app_name, &capability, &features)
    })?;
    debug!(path = %project_dir.display(), "project scaffolded");
    Ok(())
}

fn create_sample(ctx: &mut CliContext, telemetry: &dyn TelemetrySink) -> Result<()> {
    let name = ctx
        .argument(0)
        .and_then(OptionValue::as_text)
        .ok_or_else(|| EngineError::input_validation("template-name", "a value is required"))?
        .to_string();
    let description = SAMPLES
        .iter()
        .find(|(sample, _)| *sample == name)
        .map(|(_, description)| *description)
        .unwrap_or_default();

    ctx.set_telemetry_property("template", name.clone());

    instrument(telemetry, "generator", "scaffold-sample", || {
        let dir = PathBuf::from(&name);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("README.md"), format!("# {name}\n\n{description}\n"))?;
        let manifest = json!({
            "name": name,
            "template": name,
            "created-with": "forge",
        });
        fs::write(dir.join("forge.json"), serde_json::to_string_pretty(&manifest)?)?;
        Ok(())
    })?;
    Ok(())
}

fn scaffold_project(
    folder: &Path,
    app_name: &str,
    capability: &str,
    features: &[String],
) -> Result<PathBuf> {
    let dir = folder.join(app_name);
    fs::create_dir_all(&dir)?;
    let manifest = json!({
        "name": app_name,
        "capability": capability,
        "features": features,
        "created-with": "forge",
    });
    fs::write(dir.join("forge.json"), serde_json::to_string_pretty(&manifest)?)?;
    Ok(dir)
}

/// The pipeline guarantees required options are bound before dispatch; this
/// keeps the handler total anyway.
fn required_text(ctx: &CliContext, name: &str) -> Result<String> {
    ctx.text_option(name)
        .map(String::from)
        .ok_or_else(|| EngineError::input_validation(name, "a value is required"))
}
