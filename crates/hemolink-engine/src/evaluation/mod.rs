pub mod cancel;
pub mod harness;
pub mod report;

pub use cancel::Cancellation;
pub use harness::{queries_from_config, EvaluationHarness, HarnessSettings};
pub use report::{
    BestOf, CellStatus, CompositeWeights, EvaluationReport, RunMetrics, StrategyRun, StrategySummary,
    StrategyTiming,
};
