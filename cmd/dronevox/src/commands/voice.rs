//! Voice command training and recognition commands.

use chrono::{DateTime, Utc};
use clap::Args;
use dronevox_voiceprint::synth::utterance;
use dronevox_voiceprint::{MovementStep, VoiceCommand};
use serde::Serialize;

use super::{
    output_result, print_success, print_verbose, print_warning, read_sample, simulated_voice,
    Session,
};
use crate::Cli;

/// Take numbers of simulated queries start here so they never repeat a training take.
const QUERY_TAKE: u64 = 1000;

/// Train (or retrain) a voice command.
///
/// Either pass exactly one --sample per required recording (4 by default,
/// raw PCM16 LE mono or WAV) or --simulate to synthesize recordings of the
/// command name.
#[derive(Args)]
pub struct TrainCommand {
    /// Command name (the spoken phrase)
    name: String,
    /// Audio sample file, repeated once per recording
    #[arg(long = "sample", conflicts_with = "simulate")]
    samples: Vec<String>,
    /// Synthesize the recordings instead of reading files
    #[arg(long)]
    simulate: bool,
    /// Movement step as ACTION:MILLISECONDS, repeatable (e.g. --step TAKEOFF:2000)
    #[arg(long = "step")]
    steps: Vec<String>,
}

impl TrainCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let session = Session::open(cli)?;
        let required = session.store.config().samples_per_command;

        let samples: Vec<Vec<u8>> = if self.simulate {
            let voice = simulated_voice();
            (0..required as u64)
                .map(|take| utterance(&self.name, take, &voice))
                .collect()
        } else {
            if self.samples.is_empty() {
                anyhow::bail!("either --sample (x{required}) or --simulate is required");
            }
            self.samples
                .iter()
                .map(|p| read_sample(p))
                .collect::<anyhow::Result<_>>()?
        };

        let parsed = session.step_parser().parse(&self.steps);
        for w in &parsed.warnings {
            print_warning(&w.to_string());
        }
        let movement: Vec<MovementStep> = parsed.steps.into_iter().map(Into::into).collect();

        print_verbose(cli, &format!("Training '{}' from {} sample(s)", self.name, samples.len()));
        let cmd = session.store.train(&self.name, &samples, &movement)?;

        print_success(&format!("Command \"{}\" trained as {}", cmd.name, cmd.id));
        output_result(cli, &CommandSummary::from(&cmd))
    }
}

/// List trained voice commands.
#[derive(Args)]
pub struct ListCommand {}

impl ListCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let session = Session::open(cli)?;
        let commands: Vec<CommandSummary> =
            session.store.list().iter().map(CommandSummary::from).collect();
        print_success(&format!(
            "Found {} command(s) in {}",
            commands.len(),
            session.store_path().display()
        ));
        output_result(cli, &commands)
    }
}

/// Delete a trained voice command and its binding.
#[derive(Args)]
pub struct DeleteCommand {
    /// Command name
    name: String,
}

impl DeleteCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let session = Session::open(cli)?;
        let mut binder = session.load_binder()?;

        if !session.store.delete(&self.name)? {
            anyhow::bail!("command '{}' not found", self.name);
        }
        if binder.unbind(&self.name).is_some() {
            session.save_binder(&binder)?;
        }
        print_success(&format!("Command \"{}\" deleted", self.name));
        Ok(())
    }
}

/// Recognize an utterance against the trained commands.
#[derive(Args)]
pub struct RecognizeCommand {
    /// Audio sample file (raw PCM16 LE mono or WAV)
    #[arg(long, conflicts_with = "simulate")]
    sample: Option<String>,
    /// Synthesize an utterance of this phrase
    #[arg(long, value_name = "PHRASE")]
    simulate: Option<String>,
    /// Number of ranked candidates to show
    #[arg(long, default_value_t = 3)]
    top: usize,
}

impl RecognizeCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let session = Session::open(cli)?;

        let audio = match (&self.sample, &self.simulate) {
            (Some(path), _) => read_sample(path)?,
            (None, Some(phrase)) => utterance(phrase, QUERY_TAKE, &simulated_voice()),
            (None, None) => anyhow::bail!("either --sample or --simulate is required"),
        };

        let mut matches = session.recognizer().recognize_audio(&audio, &session.store)?;
        if let Some(best) = matches.first() {
            print_success(&format!(
                "Best match: \"{}\" (score {:.3}, {} confidence)",
                best.name, best.score, best.confidence
            ));
        }
        matches.truncate(self.top.max(1));
        output_result(cli, &matches)
    }
}

#[derive(Serialize)]
struct CommandSummary {
    name: String,
    id: String,
    samples: usize,
    steps: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<&VoiceCommand> for CommandSummary {
    fn from(cmd: &VoiceCommand) -> Self {
        Self {
            name: cmd.name.clone(),
            id: cmd.id.to_string(),
            samples: cmd.sample_count,
            steps: cmd.movement_sequence.iter().map(|s| s.to_string()).collect(),
            created_at: cmd.created_at,
        }
    }
}
