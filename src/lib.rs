pub mod calculator;
pub mod config;
pub mod error;
pub mod report;
pub mod store;

pub use calculator::{compute, RawInputs, ScenarioInputs, Simulation, SimulationBreakdown, SimulationResults};
pub use config::{Config, ReportSettings, StoreSettings};
pub use error::{Result, RoiError};
pub use report::{render_html, ReportScenario};
pub use store::{Scenario, ScenarioStore, ScenarioSummary};
