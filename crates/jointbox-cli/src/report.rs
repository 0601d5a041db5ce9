//! JSON reports printed on stdout.

use jointbox::{BoxSolid, ExtrusionOutcome, FaceDirection, JointOutcome};
use serde::Serialize;

/// Geometry of a created group.
#[derive(Debug, Serialize)]
pub struct ObjectReport {
    pub name: String,
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub volume: f64,
}

impl ObjectReport {
    fn new(name: &str, solid: &BoxSolid) -> Self {
        let bounds = solid.bounds();
        Self {
            name: name.to_string(),
            min: bounds.min.coords.into(),
            max: bounds.max.coords.into(),
            volume: solid.volume(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JointReport {
    #[serde(flatten)]
    pub object: ObjectReport,
    pub joined: Vec<FaceDirection>,
    pub free: Vec<FaceDirection>,
}

impl From<&JointOutcome> for JointReport {
    fn from(outcome: &JointOutcome) -> Self {
        Self {
            object: ObjectReport::new(&outcome.name, &outcome.solid),
            joined: outcome.configuration.joined().collect(),
            free: outcome.configuration.free().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtrusionReport {
    #[serde(flatten)]
    pub object: ObjectReport,
    pub absorbed_source: bool,
}

impl From<&ExtrusionOutcome> for ExtrusionReport {
    fn from(outcome: &ExtrusionOutcome) -> Self {
        Self {
            object: ObjectReport::new(&outcome.name, &outcome.solid),
            absorbed_source: outcome.absorbed_source,
        }
    }
}

/// Parent-group choices.
#[derive(Debug, Serialize)]
pub struct GroupsReport {
    pub groups: Vec<String>,
}
