//! Flight-plan XML document.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <mission>
//!   <name>Voice Command: patrol</name>
//!   <version>1</version>
//!   <created>2026-03-01T09:30:00Z</created>
//!   <creator>dronevox</creator>
//!   <waypoints>
//!     <waypoint id="0">
//!       <lat>0</lat>
//!       <lon>0</lon>
//!       <alt>0</alt>
//!       <command>22</command>
//!       <param1>0</param1>
//!       ...
//!       <param7>0</param7>
//!     </waypoint>
//!   </waypoints>
//! </mission>
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::mission::Waypoint;
use crate::FlightError;

pub const PLAN_VERSION: &str = "1";
pub const CREATOR_TAG: &str = "dronevox";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightPlanMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub creator: String,
    pub version: String,
}

impl FlightPlanMetadata {
    /// Metadata for the mission of voice command `command`.
    pub fn for_command(command: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            name: format!("Voice Command: {command}"),
            created_at,
            creator: CREATOR_TAG.to_string(),
            version: PLAN_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    pub metadata: FlightPlanMetadata,
    pub waypoints: Vec<Waypoint>,
}

impl FlightPlan {
    /// Serializes the plan. `created` keeps second precision.
    pub fn to_xml(&self) -> Result<String, FlightError> {
        let doc = MissionDoc::from(self);
        let mut out = String::from(XML_DECLARATION);
        let mut ser = quick_xml::se::Serializer::with_root(&mut out, Some("mission"))
            .map_err(|e| FlightError::Format(e.to_string()))?;
        ser.indent(' ', 2);
        doc.serialize(ser)
            .map_err(|e| FlightError::Format(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }

    pub fn from_xml(xml: &str) -> Result<Self, FlightError> {
        let doc: MissionDoc =
            quick_xml::de::from_str(xml).map_err(|e| FlightError::Format(e.to_string()))?;
        doc.try_into()
    }

    /// Writes the plan to `path`, replacing any existing file atomically.
    pub fn write(&self, path: &Path) -> Result<(), FlightError> {
        let xml = self.to_xml()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| FlightError::persistence(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FlightError::persistence(dir, e))?;
        tmp.write_all(xml.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| FlightError::persistence(path, e))?;
        tmp.persist(path)
            .map_err(|e| FlightError::persistence(path, e.error))?;

        info!(
            path = %path.display(),
            waypoints = self.waypoints.len(),
            "flight: flight plan written"
        );
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, FlightError> {
        let xml = fs::read_to_string(path).map_err(|e| FlightError::persistence(path, e))?;
        Self::from_xml(&xml)
    }
}

#[derive(Serialize, Deserialize)]
struct MissionDoc {
    name: String,
    version: String,
    created: String,
    creator: String,
    waypoints: WaypointsDoc,
}

#[derive(Serialize, Deserialize)]
struct WaypointsDoc {
    #[serde(rename = "waypoint", default)]
    items: Vec<WaypointDoc>,
}

#[derive(Serialize, Deserialize)]
struct WaypointDoc {
    #[serde(rename = "@id")]
    id: u32,
    lat: f64,
    lon: f64,
    alt: f64,
    command: u16,
    param1: f64,
    param2: f64,
    param3: f64,
    param4: f64,
    param5: f64,
    param6: f64,
    param7: f64,
}

impl From<&FlightPlan> for MissionDoc {
    fn from(plan: &FlightPlan) -> Self {
        let m = &plan.metadata;
        Self {
            name: m.name.clone(),
            version: m.version.clone(),
            created: m.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            creator: m.creator.clone(),
            waypoints: WaypointsDoc {
                items: plan.waypoints.iter().map(WaypointDoc::from).collect(),
            },
        }
    }
}

impl From<&Waypoint> for WaypointDoc {
    fn from(w: &Waypoint) -> Self {
        let [param1, param2, param3, param4, param5, param6, param7] = w.params;
        Self {
            id: w.id,
            lat: w.lat,
            lon: w.lon,
            alt: w.alt,
            command: w.command,
            param1,
            param2,
            param3,
            param4,
            param5,
            param6,
            param7,
        }
    }
}

impl From<WaypointDoc> for Waypoint {
    fn from(d: WaypointDoc) -> Self {
        Self {
            id: d.id,
            lat: d.lat,
            lon: d.lon,
            alt: d.alt,
            command: d.command,
            params: [
                d.param1, d.param2, d.param3, d.param4, d.param5, d.param6, d.param7,
            ],
        }
    }
}

impl TryFrom<MissionDoc> for FlightPlan {
    type Error = FlightError;

    fn try_from(doc: MissionDoc) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(doc.created.trim())
            .map_err(|e| FlightError::Format(format!("created {:?}: {e}", doc.created)))?
            .with_timezone(&Utc);
        Ok(Self {
            metadata: FlightPlanMetadata {
                name: doc.name,
                created_at,
                creator: doc.creator,
                version: doc.version,
            },
            waypoints: doc.waypoints.items.into_iter().map(Waypoint::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use dronevox_voiceprint::MovementStep;

    use super::*;
    use crate::mission::MissionCompiler;

    fn plan(n: usize) -> FlightPlan {
        let steps: Vec<MovementStep> = (0..n)
            .map(|i| MovementStep::new(if i % 2 == 0 { "FORWARD" } else { "ROTATE_LEFT" }, 300))
            .collect();
        FlightPlan {
            metadata: FlightPlanMetadata::for_command(
                "patrol",
                Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            ),
            waypoints: MissionCompiler::default().compile(&steps),
        }
    }

    #[test]
    fn xml_layout() {
        let xml = plan(1).to_xml().unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<mission>"));
        assert!(xml.contains("<name>Voice Command: patrol</name>"));
        assert!(xml.contains("<version>1</version>"));
        assert!(xml.contains("<created>2026-03-01T09:30:00Z</created>"));
        assert!(xml.contains("<creator>dronevox</creator>"));
        assert!(xml.contains("<waypoint id=\"1\">"));
        assert!(xml.contains("<param7>0</param7>"));
        assert_eq!(xml.matches("<waypoint ").count(), 3);
    }

    #[test]
    fn xml_round_trip_preserves_waypoints() {
        let original = plan(5);
        let parsed = FlightPlan::from_xml(&original.to_xml().unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn malformed_document_is_a_format_error() {
        assert!(matches!(
            FlightPlan::from_xml("<mission><name>x</name></mission>"),
            Err(FlightError::Format(_))
        ));
        let bad_time = plan(0)
            .to_xml()
            .unwrap()
            .replace("2026-03-01T09:30:00Z", "yesterday");
        assert!(matches!(
            FlightPlan::from_xml(&bad_time),
            Err(FlightError::Format(_))
        ));
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missions").join("patrol.xml");
        let original = plan(2);
        original.write(&path).unwrap();
        assert_eq!(FlightPlan::read(&path).unwrap(), original);

        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn write_failure_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();
        let err = plan(0).write(&blocker.join("m.xml")).unwrap_err();
        match err {
            FlightError::Persistence { path, .. } => assert!(path.starts_with(&blocker)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
