//! Flight-plan compilation commands.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use dronevox_flight::{compile_batch, mission_file_name};
use serde::Serialize;

use super::{load_input, output_result, print_success, print_verbose, print_warning, Session};
use crate::Cli;

#[derive(Serialize)]
struct MissionResult {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    waypoints: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Compile a voice command's movement sequence into a flight-plan file.
#[derive(Args)]
pub struct MissionCommand {
    /// Command name
    name: String,
    /// Output file (default: <mission dir>/mission_<name>_<timestamp>.xml)
    #[arg(long)]
    out: Option<PathBuf>,
}

impl MissionCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let session = Session::open(cli)?;
        let now = Utc::now();
        let plan = session
            .mission_compiler()
            .compile_command(&session.store, &self.name, now)?;

        let path = self
            .out
            .clone()
            .unwrap_or_else(|| session.missions_dir().join(mission_file_name(&self.name, now)));
        plan.write(&path)?;

        print_success(&format!("Flight plan written: {}", path.display()));
        output_result(
            cli,
            &MissionResult {
                command: self.name.clone(),
                path: Some(path),
                waypoints: Some(plan.waypoints.len()),
                error: None,
            },
        )
    }
}

/// Compile flight plans for several voice commands.
///
/// Commands come from the arguments or from a YAML/JSON list given with -f.
/// A failing command does not stop the rest of the batch.
#[derive(Args)]
pub struct BatchCommand {
    /// Command names
    names: Vec<String>,
}

impl BatchCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let names: Vec<String> = match cli.input.as_deref() {
            Some(path) if self.names.is_empty() => load_input(path)?,
            Some(_) => anyhow::bail!("use either command names or -f, not both"),
            None => self.names.clone(),
        };
        if names.is_empty() {
            anyhow::bail!("no commands given");
        }

        let session = Session::open(cli)?;
        let cfg = session.batch_config();
        print_verbose(cli, &format!("Writing missions to {}", cfg.output_dir.display()));

        let report = compile_batch(&session.store, &session.mission_compiler(), &names, &cfg).await;

        let results: Vec<MissionResult> = report
            .items
            .iter()
            .map(|item| match &item.result {
                Ok(path) => MissionResult {
                    command: item.command.clone(),
                    path: Some(path.clone()),
                    waypoints: None,
                    error: None,
                },
                Err(e) => MissionResult {
                    command: item.command.clone(),
                    path: None,
                    waypoints: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        output_result(cli, &results)?;

        let total = report.items.len();
        if report.failed() > 0 {
            print_warning(&format!("{} of {} mission(s) written", report.succeeded(), total));
            anyhow::bail!("{} of {} mission(s) failed", report.failed(), total);
        }
        print_success(&format!("{} mission(s) written", total));
        Ok(())
    }
}
