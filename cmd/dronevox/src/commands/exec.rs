//! Directive transmission commands.

use clap::Args;
use dronevox_flight::{ActionToken, SequenceReport};
use serde::Serialize;

use super::{
    interruptible_sequencer, load_input, output_result, print_success, print_verbose,
    print_warning, Session,
};
use crate::Cli;

/// Send the directive bound to a voice command.
#[derive(Args)]
pub struct ExecCommand {
    /// Command name
    name: String,
}

#[derive(Serialize)]
struct ExecResult<'a> {
    command: &'a str,
    action: ActionToken,
}

impl ExecCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let session = Session::open(cli)?;
        let binder = session.load_binder()?;
        let mut channel = session.channel();
        print_verbose(cli, &format!("Channel: {}", channel.describe()));

        let action = interruptible_sequencer()
            .execute_single(&self.name, &binder, channel.as_mut())
            .await?;

        print_success(&format!("Sent {} for \"{}\"", action, self.name));
        output_result(
            cli,
            &ExecResult {
                command: &self.name,
                action,
            },
        )
    }
}

/// Run a timed movement sequence.
///
/// The sequence is either the stored movement sequence of NAME, the
/// --step arguments, or a YAML/JSON list of ACTION:MILLISECONDS strings
/// given with -f. Ctrl-C stops the sequence before its next step.
#[derive(Args)]
pub struct SequenceCommand {
    /// Voice command whose stored sequence to run
    name: Option<String>,
    /// Movement step as ACTION:MILLISECONDS, repeatable
    #[arg(long = "step", conflicts_with = "name")]
    steps: Vec<String>,
}

impl SequenceCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let session = Session::open(cli)?;
        let parser = session.step_parser();
        let mut channel = session.channel();
        let sequencer = interruptible_sequencer();
        print_verbose(cli, &format!("Channel: {}", channel.describe()));

        let report: SequenceReport = match (&self.name, cli.input.as_deref()) {
            (Some(name), None) => {
                sequencer
                    .execute_stored(&session.store, &parser, name, channel.as_mut())
                    .await?
            }
            (None, input) => {
                let raw: Vec<String> = match input {
                    Some(path) if self.steps.is_empty() => load_input(path)?,
                    Some(_) => anyhow::bail!("use either --step or -f, not both"),
                    None => self.steps.clone(),
                };
                let parsed = parser.parse(&raw);
                for w in &parsed.warnings {
                    print_warning(&w.to_string());
                }
                if parsed.steps.is_empty() {
                    anyhow::bail!("no valid steps to run");
                }
                sequencer
                    .execute_sequence(&parsed.steps, channel.as_mut())
                    .await?
            }
            (Some(_), Some(_)) => anyhow::bail!("use either a command name or -f, not both"),
        };

        if report.cancelled {
            print_warning(&format!("Cancelled after {} of {} step(s)", report.sent, report.total));
        } else {
            print_success(&format!("Sent {} step(s)", report.sent));
        }
        output_result(cli, &report)
    }
}
