mod engine;
mod inputs;

pub use engine::{
    compute, Simulation, SimulationBreakdown, SimulationResults, AUTOMATED_COST_PER_INVOICE,
    ERROR_RATE_AUTO, MIN_ROI_BOOST_FACTOR, NEGATIVE_SAVINGS_DAMPING, ROI_NO_UPFRONT_COST,
};
pub use inputs::{RawInputs, ScenarioInputs, DEFAULT_TIME_HORIZON_MONTHS};
