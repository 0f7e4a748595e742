pub mod evaluation;
pub mod search;

pub use evaluation::{Cancellation, EvaluationHarness, EvaluationReport};
pub use search::{Recommendation, RecommendService};
