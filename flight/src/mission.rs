//! Movement sequence to waypoint compilation.

use chrono::{DateTime, Utc};
use dronevox_voiceprint::{MovementStep, VoiceprintStore};
use serde::{Deserialize, Serialize};

use crate::action::ActionToken;
use crate::plan::{FlightPlan, FlightPlanMetadata};
use crate::FlightError;

/// MAVLink-style flight-plan command codes.
pub mod mav {
    pub const NAV_WAYPOINT: u16 = 16;
    pub const NAV_RETURN_TO_LAUNCH: u16 = 20;
    pub const NAV_LAND: u16 = 21;
    pub const NAV_TAKEOFF: u16 = 22;
    pub const CONDITION_YAW: u16 = 115;
    pub const DO_CHANGE_SPEED: u16 = 178;

    /// Hold-position code used for actions without a dedicated code.
    pub const LOITER: u16 = NAV_WAYPOINT;
}

/// Flight-plan code of the directive named `action`.
pub fn command_code(action: &str) -> u16 {
    match action.parse::<ActionToken>() {
        Ok(ActionToken::Takeoff) => mav::NAV_TAKEOFF,
        Ok(ActionToken::Land) => mav::NAV_LAND,
        Ok(
            ActionToken::Hover
            | ActionToken::Forward
            | ActionToken::Back
            | ActionToken::Left
            | ActionToken::Right,
        ) => mav::NAV_WAYPOINT,
        Ok(ActionToken::Up | ActionToken::Down) => mav::DO_CHANGE_SPEED,
        Ok(ActionToken::RotateLeft | ActionToken::RotateRight) => mav::CONDITION_YAW,
        _ => mav::LOITER,
    }
}

/// Geometry of compiled missions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionConfig {
    /// Altitude of every movement waypoint, in meters.
    pub altitude_m: f64,
    /// Latitude/longitude increment per movement waypoint, in degrees.
    pub step_offset_deg: f64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            altitude_m: 10.0,
            step_offset_deg: 0.00001,
        }
    }
}

/// A positioned, coded flight-plan instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: u32,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub command: u16,
    pub params: [f64; 7],
}

impl Waypoint {
    pub fn new(id: u32, lat: f64, lon: f64, alt: f64, command: u16) -> Self {
        Self {
            id,
            lat,
            lon,
            alt,
            command,
            params: [0.0; 7],
        }
    }
}

/// Compiles movement sequences into `home, step 1..=N, return-to-launch`.
#[derive(Debug, Clone, Default)]
pub struct MissionCompiler {
    config: MissionConfig,
}

impl MissionCompiler {
    pub fn new(config: MissionConfig) -> Self {
        let defaults = MissionConfig::default();
        let altitude_m = if config.altitude_m.is_finite() {
            config.altitude_m
        } else {
            defaults.altitude_m
        };
        let step_offset_deg = if config.step_offset_deg.is_finite() {
            config.step_offset_deg
        } else {
            defaults.step_offset_deg
        };
        Self {
            config: MissionConfig {
                altitude_m,
                step_offset_deg,
            },
        }
    }

    pub fn config(&self) -> MissionConfig {
        self.config
    }

    /// Always returns `steps.len() + 2` waypoints.
    pub fn compile(&self, steps: &[MovementStep]) -> Vec<Waypoint> {
        let mut out = Vec::with_capacity(steps.len() + 2);
        out.push(Waypoint::new(0, 0.0, 0.0, 0.0, mav::NAV_TAKEOFF));
        for (i, step) in steps.iter().enumerate() {
            let id = i as u32 + 1;
            let offset = f64::from(id) * self.config.step_offset_deg;
            out.push(Waypoint::new(
                id,
                offset,
                offset,
                self.config.altitude_m,
                command_code(&step.action),
            ));
        }
        let rtl = steps.len() as u32 + 1;
        out.push(Waypoint::new(rtl, 0.0, 0.0, 0.0, mav::NAV_RETURN_TO_LAUNCH));
        out
    }

    /// Builds the flight plan for the stored command `name`.
    pub fn compile_command(
        &self,
        store: &VoiceprintStore,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<FlightPlan, FlightError> {
        let cmd = store.get(name).map_err(FlightError::from_lookup)?;
        Ok(FlightPlan {
            metadata: FlightPlanMetadata::for_command(&cmd.name, now),
            waypoints: self.compile(&cmd.movement_sequence),
        })
    }
}

/// File name for the mission of `command` generated at `now`.
pub fn mission_file_name(command: &str, now: DateTime<Utc>) -> String {
    let safe: String = command
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    format!("mission_{safe}_{}.xml", now.format("%Y%m%d_%H%M%S"))
}
