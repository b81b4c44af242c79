//! Command channel capability and its built-in implementations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::action::ActionToken;

/// Transport that delivers directives to the vehicle.
///
/// `send` before `connect` or after `close` returns false. Implementations
/// report failure through return values and never panic on a token; tokens
/// are validated before they reach a channel. Retry policy, if any, belongs
/// to the implementation.
#[async_trait]
pub trait CommandChannel: Send {
    /// Opens the channel. Returns false if it could not be opened.
    async fn connect(&mut self) -> bool;

    /// Sends one directive. Returns false on failure.
    async fn send(&mut self, action: ActionToken) -> bool;

    /// Closes the channel. Closing a closed channel is a no-op.
    async fn close(&mut self);

    /// Identifies the channel in errors and logs.
    fn describe(&self) -> String;
}

/// In-process stand-in for a vehicle link. Logs and records every directive.
#[derive(Debug, Default)]
pub struct SimulatedChannel {
    connected: bool,
    latency: Duration,
    sent: Vec<ActionToken>,
}

impl SimulatedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates transmission time for every directive.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Returns every directive sent so far, across connections.
    pub fn sent(&self) -> &[ActionToken] {
        &self.sent
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

#[async_trait]
impl CommandChannel for SimulatedChannel {
    async fn connect(&mut self) -> bool {
        self.connected = true;
        debug!("flight: simulated channel connected");
        true
    }

    async fn send(&mut self, action: ActionToken) -> bool {
        if !self.connected {
            warn!(%action, "flight: send on closed simulated channel");
            return false;
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        info!(%action, "flight: directive sent (simulated)");
        self.sent.push(action);
        true
    }

    async fn close(&mut self) {
        if self.connected {
            self.connected = false;
            debug!("flight: simulated channel closed");
        }
    }

    fn describe(&self) -> String {
        "simulated channel".to_string()
    }
}

/// Writes one `TOKEN\n` line per directive to a device node or file.
///
/// Line settings of serial devices (baud rate, framing) are expected to be
/// configured outside the process.
#[derive(Debug)]
pub struct LineChannel {
    path: PathBuf,
    file: Option<File>,
}

impl LineChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CommandChannel for LineChannel {
    async fn connect(&mut self) -> bool {
        if self.file.is_some() {
            return true;
        }
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
        {
            Ok(file) => {
                debug!(path = %self.path.display(), "flight: line channel connected");
                self.file = Some(file);
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "flight: line channel connect failed");
                false
            }
        }
    }

    async fn send(&mut self, action: ActionToken) -> bool {
        let Some(file) = self.file.as_mut() else {
            return false;
        };
        let line = format!("{action}\n");
        let result = match file.write_all(line.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                info!(%action, path = %self.path.display(), "flight: directive sent");
                true
            }
            Err(e) => {
                warn!(%action, path = %self.path.display(), error = %e, "flight: directive write failed");
                false
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush().await {
                warn!(path = %self.path.display(), error = %e, "flight: flush on close failed");
            }
        }
    }

    fn describe(&self) -> String {
        format!("line channel {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_send_requires_connection() {
        let mut ch = SimulatedChannel::new();
        assert!(!ch.send(ActionToken::Arm).await);
        assert!(ch.connect().await);
        assert!(ch.send(ActionToken::Arm).await);
        ch.close().await;
        assert!(!ch.send(ActionToken::Takeoff).await);
        assert_eq!(ch.sent(), &[ActionToken::Arm]);
    }

    #[tokio::test]
    async fn line_channel_writes_one_token_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("link.txt");
        let mut ch = LineChannel::new(&path);

        assert!(!ch.send(ActionToken::Arm).await);
        assert!(ch.connect().await);
        assert!(ch.send(ActionToken::Arm).await);
        assert!(ch.send(ActionToken::RotateLeft).await);
        ch.close().await;
        assert!(!ch.send(ActionToken::Land).await);

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "ARM\nROTATE_LEFT\n");
    }

    #[tokio::test]
    async fn line_channel_connect_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut ch = LineChannel::new(dir.path().join("missing").join("tty"));
        assert!(!ch.connect().await);
        assert!(ch.describe().contains("tty"));
    }
}
