//! Utility functions for CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use dronevox_cli::{load_config, Config, Context, Output, OutputFormat, Paths};
use dronevox_flight::{
    ActionCatalog, BatchConfig, CommandBinder, CommandBinding, CommandChannel, LineChannel,
    MissionCompiler, MissionConfig, Sequencer, SimulatedChannel, StepParser,
};
use dronevox_voiceprint::synth::UtteranceConfig;
use dronevox_voiceprint::{
    FrameStatsExtractor, Recognizer, RecognizerConfig, StoreConfig, VoiceprintStore,
    DEFAULT_FEATURE_COUNT,
};
use serde::Serialize;
use tracing::warn;

use crate::Cli;

pub const APP_NAME: &str = "dronevox";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the context to use: `-c`, else the current context, else defaults.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    get_config(cli)?.resolve_context(cli.context.as_deref())
}

/// Loads a list of steps or command names from a YAML or JSON file.
pub fn load_input(path: &str) -> anyhow::Result<Vec<String>> {
    let data = std::fs::read(path).with_context(|| format!("read {path}"))?;
    parse_list(&data, Path::new(path)).with_context(|| format!("parse {path}"))
}

/// `.json` files are parsed as JSON, everything else as YAML.
fn parse_list(data: &[u8], path: &Path) -> anyhow::Result<Vec<String>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let list = if is_json {
        serde_json::from_slice(data)?
    } else {
        serde_yaml::from_slice(data)?
    };
    Ok(list)
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: Serialize>(cli: &Cli, result: &T) -> anyhow::Result<()> {
    Output::new(OutputFormat::from_json_flag(cli.json), cli.output.clone()).write(result)
}

/// Prints verbose output if enabled.
pub fn print_verbose(cli: &Cli, msg: &str) {
    dronevox_cli::print_verbose(cli.verbose, msg);
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints warning message.
pub fn print_warning(msg: &str) {
    eprintln!("\x1b[33m⚠\x1b[0m {}", msg);
}

/// Reads an audio sample as PCM16 LE mono. A WAV header is skipped.
pub fn read_sample(path: &str) -> anyhow::Result<Vec<u8>> {
    const WAV_HEADER_LEN: usize = 44;
    let data = std::fs::read(path).with_context(|| format!("read sample {path}"))?;
    if data.len() >= WAV_HEADER_LEN && data.starts_with(b"RIFF") && &data[8..12] == b"WAVE" {
        return Ok(data[WAV_HEADER_LEN..].to_vec());
    }
    Ok(data)
}

/// Voice used for `--simulate` recordings.
pub fn simulated_voice() -> UtteranceConfig {
    UtteranceConfig::default()
}

/// Store, settings and on-disk locations of one invocation.
pub struct Session {
    pub ctx: Context,
    pub paths: Paths,
    pub store: VoiceprintStore,
    store_path: PathBuf,
}

impl Session {
    pub fn open(cli: &Cli) -> anyhow::Result<Self> {
        let ctx = get_context(cli)?;
        let paths = Paths::new(APP_NAME)?;
        let store_path = ctx
            .store_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.store_file());

        let dimension = ctx.feature_count.unwrap_or(DEFAULT_FEATURE_COUNT);
        let mut store_cfg = StoreConfig::default();
        if let Some(n) = ctx.samples_per_command {
            store_cfg.samples_per_command = n;
        }
        let store = VoiceprintStore::open(
            &store_path,
            store_cfg,
            Arc::new(FrameStatsExtractor::new(dimension)),
        )
        .with_context(|| format!("open store {}", store_path.display()))?;

        print_verbose(cli, &format!("Using context: {}", display_name(&ctx)));
        print_verbose(cli, &format!("Store: {}", store_path.display()));

        Ok(Self {
            ctx,
            paths,
            store,
            store_path,
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn recognizer(&self) -> Recognizer {
        let defaults = RecognizerConfig::default();
        Recognizer::new(RecognizerConfig {
            high_threshold: self.ctx.high_threshold.unwrap_or(defaults.high_threshold),
            medium_threshold: self.ctx.medium_threshold.unwrap_or(defaults.medium_threshold),
        })
    }

    pub fn step_parser(&self) -> StepParser {
        match self.ctx.default_step_ms {
            Some(ms) => StepParser::with_default_duration(ActionCatalog::new(), ms),
            None => StepParser::default(),
        }
    }

    /// Bindings file, kept next to the store file.
    pub fn bindings_path(&self) -> PathBuf {
        self.store_path
            .parent()
            .map(|dir| dir.join(dronevox_cli::paths::BINDINGS_FILE))
            .unwrap_or_else(|| self.paths.bindings_file())
    }

    /// Builds the binder with the saved bindings restored.
    pub fn load_binder(&self) -> anyhow::Result<CommandBinder> {
        let mut binder = CommandBinder::new(Arc::new(ActionCatalog::new()));
        let path = self.bindings_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("read bindings {}", path.display()))?;
            let saved: Vec<CommandBinding> = if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_yaml::from_str(&content)
                    .with_context(|| format!("parse bindings {}", path.display()))?
            };
            let total = saved.len();
            let restored = binder.restore(&self.store, saved);
            if restored < total {
                warn!(dropped = total - restored, "dropped bindings of deleted commands");
            }
        }
        Ok(binder)
    }

    pub fn save_binder(&self, binder: &CommandBinder) -> anyhow::Result<()> {
        let path = self.bindings_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_yaml::to_string(&binder.bindings())?;
        std::fs::write(&path, content)
            .with_context(|| format!("write bindings {}", path.display()))?;
        Ok(())
    }

    /// Channel selected by the context: the device if set, else a simulated link.
    pub fn channel(&self) -> Box<dyn CommandChannel> {
        match self.ctx.device.as_deref() {
            Some(device) if !device.is_empty() => Box::new(LineChannel::new(device)),
            _ => {
                let latency = Duration::from_millis(self.ctx.send_latency_ms.unwrap_or(0));
                Box::new(SimulatedChannel::with_latency(latency))
            }
        }
    }

    pub fn mission_compiler(&self) -> MissionCompiler {
        let mut cfg = MissionConfig::default();
        if let Some(alt) = self.ctx.altitude_m {
            cfg.altitude_m = alt;
        }
        MissionCompiler::new(cfg)
    }

    pub fn missions_dir(&self) -> PathBuf {
        self.ctx
            .mission_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.paths.missions_dir())
    }

    pub fn batch_config(&self) -> BatchConfig {
        let mut cfg = BatchConfig {
            output_dir: self.missions_dir(),
            ..BatchConfig::default()
        };
        if let Some(ms) = self.ctx.batch_pause_ms {
            cfg.pause = Duration::from_millis(ms);
        }
        cfg
    }
}

/// Returns a sequencer that is cancelled by Ctrl-C.
pub fn interruptible_sequencer() -> Sequencer {
    let sequencer = Sequencer::new();
    let token = sequencer.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            print_warning("interrupted, stopping before the next step");
            token.cancel();
        }
    });
    sequencer
}

fn display_name(ctx: &Context) -> &str {
    if ctx.name.is_empty() {
        "(defaults)"
    } else {
        &ctx.name
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_load_yaml_step_list() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "- TAKEOFF:2000\n- FORWARD:500").unwrap();

        let steps = load_input(file.path().to_str().unwrap()).unwrap();
        assert_eq!(steps, vec!["TAKEOFF:2000", "FORWARD:500"]);
    }

    #[test]
    fn test_load_json_command_list() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"["взлет", "посадка"]"#).unwrap();

        let names = load_input(file.path().to_str().unwrap()).unwrap();
        assert_eq!(names, vec!["взлет", "посадка"]);
    }

    #[test]
    fn test_unknown_extension_reads_yaml() {
        let names = parse_list(b"- hover", Path::new("names.txt")).unwrap();
        assert_eq!(names, vec!["hover"]);
    }

    #[test]
    fn test_invalid_list_fails() {
        assert!(parse_list(b"invalid data {{{{", Path::new("names.json")).is_err());
        assert!(parse_list(b"steps: 3", Path::new("names.yaml")).is_err());
    }
}
