//! Binding commands.

use clap::Args;
use dronevox_flight::{command_code, ActionCatalog, ActionToken};
use serde::Serialize;

use super::{output_result, print_success, Session};
use crate::Cli;

/// Bind a voice command to a flight directive.
///
/// Without --action the command name is looked up in the default phrase
/// table (see `dronevox actions`).
#[derive(Args)]
pub struct BindCommand {
    /// Command name
    name: String,
    /// Directive token (e.g. TAKEOFF, ROTATE_LEFT)
    #[arg(long)]
    action: Option<String>,
}

impl BindCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let session = Session::open(cli)?;
        let mut binder = session.load_binder()?;

        let binding = binder.bind(&session.store, &self.name, self.action.as_deref())?;
        session.save_binder(&binder)?;

        print_success(&format!("Command \"{}\" bound to {}", binding.command, binding.action));
        output_result(cli, &binding)
    }
}

/// Show command bindings.
#[derive(Args)]
pub struct BindingsCommand {}

impl BindingsCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let session = Session::open(cli)?;
        let binder = session.load_binder()?;
        output_result(cli, &binder.bindings())
    }
}

/// Show supported directives, their flight-plan codes and default phrases.
#[derive(Args)]
pub struct ActionsCommand {}

#[derive(Serialize)]
struct ActionInfo<'a> {
    action: ActionToken,
    mission_code: u16,
    phrases: Vec<&'a str>,
}

impl ActionsCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let catalog = ActionCatalog::new();
        let phrases = catalog.phrases();
        let actions: Vec<ActionInfo<'_>> = catalog
            .actions()
            .iter()
            .map(|&action| ActionInfo {
                action,
                mission_code: command_code(action.as_str()),
                phrases: phrases
                    .iter()
                    .filter(|(_, a)| *a == action)
                    .map(|(p, _)| *p)
                    .collect(),
            })
            .collect();
        output_result(cli, &actions)
    }
}
