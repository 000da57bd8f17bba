pub mod result;
pub mod scenario;

pub use result::SimulationResult;
pub use scenario::{MetricInputs, Scenario, ScenarioInput};
