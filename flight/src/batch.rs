use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use dronevox_voiceprint::VoiceprintStore;
use tracing::{info, warn};

use crate::mission::{mission_file_name, MissionCompiler};
use crate::FlightError;

/// Where and how fast a batch writes its missions.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub output_dir: PathBuf,
    /// Pause between consecutive items.
    pub pause: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            pause: Duration::from_secs(2),
        }
    }
}

#[derive(Debug)]
pub struct BatchItem {
    pub command: String,
    pub result: Result<PathBuf, FlightError>,
}

/// Per-command outcome of a batch, in request order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

/// Compiles and writes one mission per command, in order.
///
/// A failing command is recorded in the report and does not stop the batch.
pub async fn compile_batch<S: AsRef<str>>(
    store: &VoiceprintStore,
    compiler: &MissionCompiler,
    commands: &[S],
    cfg: &BatchConfig,
) -> BatchReport {
    let mut report = BatchReport::default();
    for (i, command) in commands.iter().enumerate() {
        if i > 0 && !cfg.pause.is_zero() {
            tokio::time::sleep(cfg.pause).await;
        }
        let command = command.as_ref();
        let result = compile_one(store, compiler, command, cfg);
        match &result {
            Ok(path) => info!(command, path = %path.display(), "flight: batch item written"),
            Err(e) => warn!(command, error = %e, "flight: batch item failed"),
        }
        report.items.push(BatchItem {
            command: command.to_string(),
            result,
        });
    }
    info!(
        succeeded = report.succeeded(),
        total = report.items.len(),
        "flight: batch complete"
    );
    report
}

fn compile_one(
    store: &VoiceprintStore,
    compiler: &MissionCompiler,
    command: &str,
    cfg: &BatchConfig,
) -> Result<PathBuf, FlightError> {
    let now = Utc::now();
    let plan = compiler.compile_command(store, command, now)?;
    let path = cfg.output_dir.join(mission_file_name(command, now));
    plan.write(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dronevox_voiceprint::{FrameStatsExtractor, MovementStep, StoreConfig};
    use tokio::time::Instant;

    use super::*;
    use crate::plan::FlightPlan;

    fn store() -> VoiceprintStore {
        let store = VoiceprintStore::in_memory(
            StoreConfig::default(),
            Arc::new(FrameStatsExtractor::new(2)),
        );
        store
            .train_features(
                "patrol",
                vec![vec![0.2, 0.4]; 4],
                &[MovementStep::new("TAKEOFF", 100), MovementStep::new("LAND", 100)],
            )
            .unwrap();
        store
            .train_features("hover", vec![vec![0.4, 0.2]; 4], &[])
            .unwrap();
        store
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BatchConfig {
            output_dir: dir.path().to_path_buf(),
            pause: Duration::from_secs(2),
        };
        let start = Instant::now();
        let report = compile_batch(
            &store(),
            &MissionCompiler::default(),
            &["patrol", "ghost", "hover"],
            &cfg,
        )
        .await;

        assert_eq!(report.items.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            &report.items[1].result,
            Err(FlightError::UnknownCommand { name }) if name == "ghost"
        ));
        assert!(start.elapsed() >= Duration::from_secs(4));

        let patrol = report.items[0].result.as_ref().unwrap();
        assert_eq!(FlightPlan::read(patrol).unwrap().waypoints.len(), 4);
        let hover = report.items[2].result.as_ref().unwrap();
        assert_eq!(FlightPlan::read(hover).unwrap().waypoints.len(), 2);
    }

    #[tokio::test]
    async fn unwritable_destination_is_reported_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let cfg = BatchConfig {
            output_dir: blocker,
            pause: Duration::ZERO,
        };
        let report = compile_batch(&store(), &MissionCompiler::default(), &["patrol"], &cfg).await;
        assert_eq!(report.succeeded(), 0);
        assert!(matches!(
            report.items[0].result,
            Err(FlightError::Persistence { .. })
        ));
    }
}
