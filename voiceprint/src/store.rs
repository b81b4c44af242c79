use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::command::{CommandId, MovementStep, VoiceCommand};
use crate::extractor::FeatureExtractor;
use crate::similarity::mean;
use crate::VoiceprintError;

/// Number of audio samples collected per trained command.
pub const DEFAULT_SAMPLES_PER_COMMAND: usize = 4;

const STORE_FORMAT_VERSION: u32 = 1;

/// Configuration for [`VoiceprintStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Exact number of samples `train` requires (default: 4).
    pub samples_per_command: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            samples_per_command: DEFAULT_SAMPLES_PER_COMMAND,
        }
    }
}

impl StoreConfig {
    fn with_defaults(mut self) -> Self {
        if self.samples_per_command == 0 {
            self.samples_per_command = DEFAULT_SAMPLES_PER_COMMAND;
        }
        self
    }
}

/// On-disk layout of the store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreSnapshot {
    version: u32,
    /// Highest id ever assigned, including deleted commands.
    next_id: u64,
    commands: Vec<VoiceCommand>,
}

impl StoreSnapshot {
    fn empty() -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            next_id: 0,
            commands: Vec::new(),
        }
    }
}

/// Persistent store of trained voice commands, keyed by name.
///
/// The whole store is loaded on [`VoiceprintStore::open`] and written back
/// after every mutation by atomically replacing the store file (temp file in
/// the same directory, fsync, rename). A failed write leaves both the file
/// and the in-memory state as they were.
///
/// Reads run concurrently; mutations are serialized by a single write lock
/// held across the flush.
pub struct VoiceprintStore {
    cfg: StoreConfig,
    path: Option<PathBuf>,
    extractor: Arc<dyn FeatureExtractor>,
    state: RwLock<StoreSnapshot>,
}

impl VoiceprintStore {
    /// Opens the store file at `path`, starting empty if it does not exist yet.
    pub fn open(
        path: impl Into<PathBuf>,
        cfg: StoreConfig,
        extractor: Arc<dyn FeatureExtractor>,
    ) -> Result<Self, VoiceprintError> {
        let path = path.into();
        let snapshot = match fs::read(&path) {
            Ok(data) => serde_json::from_slice::<StoreSnapshot>(&data).map_err(|source| {
                VoiceprintError::Codec {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoreSnapshot::empty(),
            Err(e) => return Err(VoiceprintError::persistence(&path, e)),
        };
        let snapshot = validate_snapshot(snapshot, extractor.dimension())?;

        info!(
            path = %path.display(),
            commands = snapshot.commands.len(),
            "voiceprint: store loaded"
        );

        Ok(Self {
            cfg: cfg.with_defaults(),
            path: Some(path),
            extractor,
            state: RwLock::new(snapshot),
        })
    }

    /// Creates a store that is never written to disk.
    pub fn in_memory(cfg: StoreConfig, extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self {
            cfg: cfg.with_defaults(),
            path: None,
            extractor,
            state: RwLock::new(StoreSnapshot::empty()),
        }
    }

    /// Trains (or retrains) `name` from exactly `samples_per_command` audio samples.
    ///
    /// Each sample goes through the extractor; the fingerprint is the
    /// element-wise mean of the resulting vectors.
    pub fn train<A: AsRef<[u8]>>(
        &self,
        name: &str,
        samples: &[A],
        movement: &[MovementStep],
    ) -> Result<VoiceCommand, VoiceprintError> {
        let name = checked_name(name)?;
        self.check_sample_count(name, samples.len())?;

        let features = samples
            .iter()
            .map(|s| self.extractor.extract(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.train_features(name, features, movement)
    }

    /// Trains (or retrains) `name` from pre-extracted feature vectors.
    pub fn train_features(
        &self,
        name: &str,
        features: Vec<Vec<f32>>,
        movement: &[MovementStep],
    ) -> Result<VoiceCommand, VoiceprintError> {
        let name = checked_name(name)?;
        self.check_sample_count(name, features.len())?;

        let dim = self.extractor.dimension();
        if let Some(bad) = features.iter().find(|f| f.len() != dim) {
            return Err(VoiceprintError::DimensionMismatch {
                expected: dim,
                got: bad.len(),
            });
        }
        if features.iter().flatten().any(|x| !x.is_finite()) {
            return Err(VoiceprintError::Validation(format!(
                "command {name:?}: feature vectors must be finite"
            )));
        }

        let movement_sequence: Vec<MovementStep> = movement
            .iter()
            .filter(|step| {
                let ok = step.is_well_formed();
                if !ok {
                    warn!(command = name, step = %step, "voiceprint: dropping malformed movement step");
                }
                ok
            })
            .cloned()
            .collect();

        let fingerprint = mean(&features, dim);

        let mut state = self.state.write();
        let mut next = state.clone();
        next.next_id += 1;
        let command = VoiceCommand {
            id: CommandId(next.next_id),
            name: name.to_string(),
            fingerprint,
            sample_count: features.len(),
            sample_features: features,
            movement_sequence,
            created_at: Utc::now(),
        };
        match next.commands.iter_mut().find(|c| c.name == name) {
            Some(slot) => *slot = command.clone(),
            None => next.commands.push(command.clone()),
        }
        self.flush(&next)?;
        *state = next;

        info!(
            command = name,
            id = %command.id,
            steps = command.movement_sequence.len(),
            "voiceprint: command trained"
        );
        Ok(command)
    }

    /// Returns the command named `name`.
    ///
    /// Names are matched the way `train` stores them, without surrounding
    /// whitespace.
    pub fn get(&self, name: &str) -> Result<VoiceCommand, VoiceprintError> {
        let name = name.trim();
        self.state
            .read()
            .commands
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| VoiceprintError::NotFound {
                name: name.to_string(),
            })
    }

    /// Reports whether a command named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.state.read().commands.iter().any(|c| c.name == name)
    }

    /// Returns all commands in insertion order.
    pub fn list(&self) -> Vec<VoiceCommand> {
        self.state.read().commands.clone()
    }

    /// Removes `name`. Returns whether it existed; nothing is written when it did not.
    pub fn delete(&self, name: &str) -> Result<bool, VoiceprintError> {
        let name = name.trim();
        let mut state = self.state.write();
        let Some(pos) = state.commands.iter().position(|c| c.name == name) else {
            debug!(command = name, "voiceprint: delete of unknown command");
            return Ok(false);
        };
        let mut next = state.clone();
        next.commands.remove(pos);
        self.flush(&next)?;
        *state = next;

        info!(command = name, "voiceprint: command deleted");
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.state.read().commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the backing file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn extractor(&self) -> &Arc<dyn FeatureExtractor> {
        &self.extractor
    }

    /// Returns the fingerprint length shared by every stored command.
    pub fn dimension(&self) -> usize {
        self.extractor.dimension()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    fn check_sample_count(&self, name: &str, got: usize) -> Result<(), VoiceprintError> {
        if got != self.cfg.samples_per_command {
            return Err(VoiceprintError::Validation(format!(
                "command {name:?}: expected {} samples, got {got}",
                self.cfg.samples_per_command
            )));
        }
        Ok(())
    }

    fn flush(&self, snapshot: &StoreSnapshot) -> Result<(), VoiceprintError> {
        match &self.path {
            Some(path) => write_atomic(path, snapshot),
            None => Ok(()),
        }
    }
}

fn checked_name(name: &str) -> Result<&str, VoiceprintError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VoiceprintError::Validation(
            "command name must not be empty".into(),
        ));
    }
    Ok(name)
}

fn validate_snapshot(
    mut snapshot: StoreSnapshot,
    dim: usize,
) -> Result<StoreSnapshot, VoiceprintError> {
    if let Some(bad) = snapshot.commands.iter().find(|c| c.fingerprint.len() != dim) {
        return Err(VoiceprintError::DimensionMismatch {
            expected: dim,
            got: bad.fingerprint.len(),
        });
    }
    check_commands(&snapshot.commands)?;
    // A hand-edited file may lag behind its own ids.
    let max_id = snapshot.commands.iter().map(|c| c.id.0).max().unwrap_or(0);
    snapshot.next_id = snapshot.next_id.max(max_id);
    Ok(snapshot)
}

fn check_commands(commands: &[VoiceCommand]) -> Result<(), VoiceprintError> {
    let mut seen = HashSet::new();
    for c in commands {
        if !seen.insert(c.name.as_str()) {
            return Err(VoiceprintError::Validation(format!(
                "store lists command {:?} more than once",
                c.name
            )));
        }
        let finite = c
            .fingerprint
            .iter()
            .chain(c.sample_features.iter().flatten())
            .all(|x| x.is_finite());
        if !finite {
            return Err(VoiceprintError::Validation(format!(
                "command {:?} has non-finite features",
                c.name
            )));
        }
    }
    Ok(())
}

fn write_atomic(path: &Path, snapshot: &StoreSnapshot) -> Result<(), VoiceprintError> {
    let data = serde_json::to_vec_pretty(snapshot).map_err(|source| VoiceprintError::Codec {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| VoiceprintError::persistence(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| VoiceprintError::persistence(dir, e))?;
    tmp.write_all(&data)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| VoiceprintError::persistence(path, e))?;
    tmp.persist(path)
        .map_err(|e| VoiceprintError::persistence(path, e.error))?;
    Ok(())
}
