use std::fmt::Display;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Diet,
    Workout,
}

impl Display for PlanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Diet => "diet",
            PlanKind::Workout => "workout",
        }
    }

    /// Key under which the plan's loosely typed per-day content lives.
    pub fn content_key(&self) -> &'static str {
        match self {
            PlanKind::Diet => "meals",
            PlanKind::Workout => "exercises",
        }
    }
}

impl TryFrom<&str> for PlanKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "diet" => Ok(PlanKind::Diet),
            "workout" => Ok(PlanKind::Workout),
            other => Err(anyhow!("unknown plan kind: {other}")),
        }
    }
}
