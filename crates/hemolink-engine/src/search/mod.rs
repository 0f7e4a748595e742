pub mod service;

pub use service::{Recommendation, RecommendService};
