//! Run the agent behind its front-end plugins.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::Colorize;
use forge_core::{requirement, Agent, Application, ModelAgent, ModelConfig, Service};
use forge_telegram::{TelegramBot, TelegramConfig};
use forge_web::{A2aConfig, A2aService};

use super::plugins;
use crate::output;

#[derive(Args)]
pub struct ServeArgs {
    /// Character file describing the agent (JSON)
    #[arg(short, long)]
    pub character: PathBuf,

    /// Plugin to run; repeatable (defaults to the character's plugins)
    #[arg(short, long = "plugin")]
    pub plugins: Vec<String>,

    /// Host the A2A server binds to
    #[arg(long, env = "FORGE_A2A_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port the A2A server listens on
    #[arg(long, env = "FORGE_A2A_PORT", default_value = "8000")]
    pub port: u16,

    /// URL advertised in the agent card
    #[arg(long, env = "FORGE_A2A_URL")]
    pub public_url: Option<String>,
}

/// Resolve the plugin list: explicit flags win, otherwise the character's own.
fn select_plugins(requested: &[String], declared: &[String]) -> Result<Vec<String>> {
    let source = if requested.is_empty() { declared } else { requested };

    let mut selected: Vec<String> = Vec::new();
    for name in source {
        if plugins::find(name).is_none() {
            let known: Vec<&str> = plugins::AVAILABLE.iter().map(|p| p.name).collect();
            bail!("Unknown plugin '{}' (available: {})", name, known.join(", "));
        }
        if !selected.contains(name) {
            selected.push(name.clone());
        }
    }

    if selected.is_empty() {
        bail!("Nothing to serve: pass --plugin or list plugins in the character file");
    }
    Ok(selected)
}

fn create_service(name: &str, args: &ServeArgs, agent: Arc<dyn Agent>) -> Result<Box<dyn Service>> {
    match name {
        "a2a" => Ok(Box::new(A2aService::new(
            agent,
            A2aConfig {
                host: args.host.clone(),
                port: args.port,
                public_url: args.public_url.clone(),
            },
        ))),
        "telegram" => {
            let config = TelegramConfig::from_env()?;
            Ok(Box::new(TelegramBot::new(agent, config)))
        }
        other => Err(anyhow!("Unknown plugin '{}'", other)),
    }
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let req = requirement::load(&args.character)
        .with_context(|| format!("Failed to read character file {}", args.character.display()))?;
    let spec = requirement::validate(&req)?;
    let selected = select_plugins(&args.plugins, &spec.plugins)?;

    let model = ModelConfig::from_env()?;
    tracing::debug!(model = %model.model_id, base_url = %model.base_url, "Model backend");
    let agent: Arc<dyn Agent> = Arc::new(ModelAgent::new(
        spec.name.clone(),
        spec.description.clone(),
        spec.prompt.clone(),
        model,
    ));

    let mut app = Application::new();
    for name in &selected {
        let service = create_service(name, &args, Arc::clone(&agent))?;
        app.register_boxed(service).await?;
    }

    println!();
    println!("  {} {}", "Forge".cyan().bold(), spec.name.bold());
    println!();
    for name in &selected {
        println!("  {} {}", "→".dimmed(), name.green());
    }
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let report = app.run().await?;
    output::print_stop_report(&report);

    if !report.is_clean() {
        bail!("{} service(s) failed to stop cleanly", report.failures.len());
    }
    Ok(())
}
