//! Configuration management commands.

use clap::{Args, Subcommand};
use dronevox_cli::Context as CliContext;
use serde::Serialize;

use super::{get_config, output_result, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts hold the store location, recognition thresholds, the vehicle
/// device and mission settings, similar to kubectl's context management.
///
/// Configuration is stored in ~/.dronevox/dronevox/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Args, Clone)]
struct ContextArgs {
    /// Voiceprint store file
    #[arg(long)]
    store_path: Option<String>,
    /// Feature vector length
    #[arg(long)]
    feature_count: Option<usize>,
    /// Audio samples required per command
    #[arg(long)]
    samples_per_command: Option<usize>,
    /// Score above which a match is high confidence
    #[arg(long)]
    high_threshold: Option<f32>,
    /// Score above which a match is medium confidence
    #[arg(long)]
    medium_threshold: Option<f32>,
    /// Fallback step duration in milliseconds
    #[arg(long)]
    default_step_ms: Option<u64>,
    /// Device node or file receiving directives (default: simulated)
    #[arg(long)]
    device: Option<String>,
    /// Simulated send latency in milliseconds
    #[arg(long)]
    send_latency_ms: Option<u64>,
    /// Mission output directory
    #[arg(long)]
    mission_dir: Option<String>,
    /// Pause between batch items in milliseconds
    #[arg(long)]
    batch_pause_ms: Option<u64>,
    /// Waypoint altitude in meters
    #[arg(long)]
    altitude_m: Option<f64>,
}

impl ContextArgs {
    fn into_context(self) -> CliContext {
        CliContext {
            store_path: self.store_path,
            feature_count: self.feature_count,
            samples_per_command: self.samples_per_command,
            high_threshold: self.high_threshold,
            medium_threshold: self.medium_threshold,
            default_step_ms: self.default_step_ms,
            device: self.device,
            send_latency_ms: self.send_latency_ms,
            mission_dir: self.mission_dir,
            batch_pause_ms: self.batch_pause_ms,
            altitude_m: self.altitude_m,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add (or replace) a context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        #[command(flatten)]
        settings: ContextArgs,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext { name, settings } => {
                let mut cfg = get_config(cli)?;
                cfg.add_context(name, settings.clone().into_context())?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;
                let names = cfg.list_contexts();
                if names.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!("{:<8} {:<20} {:<30} STORE", "CURRENT", "NAME", "DEVICE");
                for name in names {
                    let Some(ctx) = cfg.get_context(name) else {
                        continue;
                    };
                    let current = if name == cfg.current_context { "*" } else { "" };
                    let device = ctx.device.as_deref().unwrap_or("(simulated)");
                    let store = ctx.store_path.as_deref().unwrap_or("(default)");
                    println!("{:<8} {:<20} {:<30} {}", current, name, device, store);
                }
                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;
                eprintln!("Config file: {}", cfg.path().display());
                let mut contexts: Vec<&CliContext> = cfg.contexts.values().collect();
                contexts.sort_by(|a, b| a.name.cmp(&b.name));
                output_result(
                    cli,
                    &ViewDoc {
                        current_context: &cfg.current_context,
                        contexts,
                    },
                )
            }
        }
    }
}

#[derive(Serialize)]
struct ViewDoc<'a> {
    current_context: &'a str,
    contexts: Vec<&'a CliContext>,
}
