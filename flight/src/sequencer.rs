//! Timed execution of directives over a [`CommandChannel`].

use std::time::Duration;

use dronevox_voiceprint::VoiceprintStore;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::ActionToken;
use crate::binder::CommandBinder;
use crate::channel::CommandChannel;
use crate::step::{Step, StepParser};
use crate::FlightError;

/// Outcome of a sequence that ran without a channel failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    /// Steps sent successfully.
    pub sent: usize,
    /// Steps in the sequence.
    pub total: usize,
    /// Whether the sequence stopped early on cancellation.
    pub cancelled: bool,
}

/// Drives directives through a channel.
///
/// The channel is connected right before use and closed on every exit path.
/// Cancelling the token stops a running sequence before its next step;
/// directives already sent are not undone.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    cancel: CancellationToken,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Sends the directive bound to `command` as a single transmission.
    pub async fn execute_single<C>(
        &self,
        command: &str,
        binder: &CommandBinder,
        channel: &mut C,
    ) -> Result<ActionToken, FlightError>
    where
        C: CommandChannel + ?Sized,
    {
        let action = binder.resolve(command)?;

        let result = if !channel.connect().await {
            Err(FlightError::Connect {
                channel: channel.describe(),
            })
        } else if !channel.send(action).await {
            Err(FlightError::Transmission {
                channel: channel.describe(),
                step: 0,
                action,
                sent: 0,
            })
        } else {
            Ok(action)
        };
        channel.close().await;

        if result.is_ok() {
            info!(command, %action, "flight: command executed");
        }
        result
    }

    /// Sends `steps` in order, pausing each step's duration after sending it.
    ///
    /// A failed send aborts the sequence; the error carries the failing step
    /// index and how many steps were sent before it.
    pub async fn execute_sequence<C>(
        &self,
        steps: &[Step],
        channel: &mut C,
    ) -> Result<SequenceReport, FlightError>
    where
        C: CommandChannel + ?Sized,
    {
        let result = if channel.connect().await {
            self.run(steps, channel).await
        } else {
            Err(FlightError::Connect {
                channel: channel.describe(),
            })
        };
        channel.close().await;
        result
    }

    /// Runs the stored movement sequence of `command`.
    pub async fn execute_stored<C>(
        &self,
        store: &VoiceprintStore,
        parser: &StepParser,
        command: &str,
        channel: &mut C,
    ) -> Result<SequenceReport, FlightError>
    where
        C: CommandChannel + ?Sized,
    {
        let cmd = store.get(command).map_err(FlightError::from_lookup)?;
        if !cmd.has_sequence() {
            return Err(FlightError::Validation(format!(
                "voice command {command:?} has no movement sequence"
            )));
        }
        let parsed = parser.from_movements(&cmd.movement_sequence);
        if parsed.steps.is_empty() {
            return Err(FlightError::Validation(format!(
                "voice command {command:?} has no executable steps"
            )));
        }
        self.execute_sequence(&parsed.steps, channel).await
    }

    async fn run<C>(&self, steps: &[Step], channel: &mut C) -> Result<SequenceReport, FlightError>
    where
        C: CommandChannel + ?Sized,
    {
        let total = steps.len();
        let mut sent = 0;

        for (index, step) in steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                break;
            }
            if !channel.send(step.action).await {
                warn!(step = index, action = %step.action, sent, "flight: sequence aborted");
                return Err(FlightError::Transmission {
                    channel: channel.describe(),
                    step: index,
                    action: step.action,
                    sent,
                });
            }
            sent += 1;
            debug!(step = index, %step, "flight: step sent");

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_millis(step.duration_ms)) => {}
            }
        }

        let cancelled = sent < total;
        if cancelled {
            info!(sent, total, "flight: sequence cancelled");
        } else {
            info!(total, "flight: sequence complete");
        }
        Ok(SequenceReport {
            sent,
            total,
            cancelled,
        })
    }
}
