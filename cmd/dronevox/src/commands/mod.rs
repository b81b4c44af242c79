//! CLI commands module.

mod bind;
mod config;
mod exec;
mod mission;
mod util;
mod voice;

pub use bind::{ActionsCommand, BindCommand, BindingsCommand};
pub use config::ConfigCommand;
pub use exec::{ExecCommand, SequenceCommand};
pub use mission::{BatchCommand, MissionCommand};
pub use voice::{DeleteCommand, ListCommand, RecognizeCommand, TrainCommand};

pub(crate) use util::*;
