pub mod report;
pub mod roi;
pub mod scenario;

pub use report::{ReportMetadata, ReportRenderer};
pub use roi::{RoiEngine, RoiPolicy};
pub use scenario::ScenarioService;
