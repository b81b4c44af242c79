//! dronevox - voice commands for a quadcopter.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    ActionsCommand, BatchCommand, BindCommand, BindingsCommand, ConfigCommand, DeleteCommand,
    ExecCommand, ListCommand, MissionCommand, RecognizeCommand, SequenceCommand, TrainCommand,
};

/// dronevox - voice commands for a quadcopter.
///
/// Train named voice commands from audio samples, bind them to flight
/// directives, send them to the vehicle one by one or as timed movement
/// sequences, and compile movement sequences into XML flight plans.
///
/// Configuration is stored in ~/.dronevox/dronevox/ and supports multiple contexts,
/// similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "dronevox")]
#[command(about = "Voice command trainer and flight sequencer")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.dronevox/dronevox/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Input file (YAML or JSON list of steps or command names)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Train (or retrain) a voice command
    Train(TrainCommand),
    /// List trained voice commands
    List(ListCommand),
    /// Delete a trained voice command
    Delete(DeleteCommand),
    /// Recognize an utterance against the trained commands
    Recognize(RecognizeCommand),
    /// Bind a voice command to a flight directive
    Bind(BindCommand),
    /// Show command bindings
    Bindings(BindingsCommand),
    /// Show supported directives and their default phrases
    Actions(ActionsCommand),
    /// Send the directive bound to a voice command
    Exec(ExecCommand),
    /// Run a timed movement sequence
    Sequence(SequenceCommand),
    /// Compile a voice command into a flight-plan file
    Mission(MissionCommand),
    /// Compile flight plans for several voice commands
    Batch(BatchCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli).await,
        Commands::Train(cmd) => cmd.run(&cli).await,
        Commands::List(cmd) => cmd.run(&cli).await,
        Commands::Delete(cmd) => cmd.run(&cli).await,
        Commands::Recognize(cmd) => cmd.run(&cli).await,
        Commands::Bind(cmd) => cmd.run(&cli).await,
        Commands::Bindings(cmd) => cmd.run(&cli).await,
        Commands::Actions(cmd) => cmd.run(&cli).await,
        Commands::Exec(cmd) => cmd.run(&cli).await,
        Commands::Sequence(cmd) => cmd.run(&cli).await,
        Commands::Mission(cmd) => cmd.run(&cli).await,
        Commands::Batch(cmd) => cmd.run(&cli).await,
    }
}
