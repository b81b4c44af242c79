//! From trained voice commands to vehicle directives and flight plans.
//!
//! A recognized command is bound to an [`ActionToken`] by the
//! [`CommandBinder`]. The [`Sequencer`] sends bound directives, or a
//! command's stored movement sequence, through a [`CommandChannel`]. The
//! [`MissionCompiler`] turns the same movement sequence into a
//! [`FlightPlan`] of waypoints:
//!
//! ```text
//! id 0      home              NAV_TAKEOFF
//! id 1..=N  movement steps    code per action, lat = lon = i * 0.00001, alt 10
//! id N+1    return to launch  NAV_RETURN_TO_LAUNCH
//! ```

mod action;
mod batch;
mod binder;
mod channel;
mod error;
mod mission;
mod plan;
mod sequencer;
mod step;

pub use action::{ActionCatalog, ActionToken, DEFAULT_PHRASES};
pub use batch::{compile_batch, BatchConfig, BatchItem, BatchReport};
pub use binder::{BindingSource, CommandBinder, CommandBinding};
pub use channel::{CommandChannel, LineChannel, SimulatedChannel};
pub use error::FlightError;
pub use mission::{command_code, mav, mission_file_name, MissionCompiler, MissionConfig, Waypoint};
pub use plan::{FlightPlan, FlightPlanMetadata, CREATOR_TAG, PLAN_VERSION};
pub use sequencer::{SequenceReport, Sequencer};
pub use step::{ParsedSteps, Step, StepParser, StepWarning, DEFAULT_STEP_DURATION_MS};
