use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculator::{ScenarioInputs, SimulationResults};

/// A saved simulation
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Scenario {
    pub id: String,
    pub scenario_name: String,
    pub inputs: ScenarioInputs,
    pub results: SimulationResults,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Listing view of a scenario, without inputs or results
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScenarioSummary {
    pub id: String,
    pub scenario_name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Scenario> for ScenarioSummary {
    fn from(scenario: &Scenario) -> Self {
        Self {
            id: scenario.id.clone(),
            scenario_name: scenario.scenario_name.clone(),
            created_at: scenario.created_at,
            updated_at: scenario.updated_at,
        }
    }
}
