use thiserror::Error;

/// Failures surfaced by the ranking and evaluation paths.
///
/// Problems with a single candidate (bad rating, bad coordinates) are not
/// errors; they become [`crate::ranking::Exclusion`] records instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RankError {
    #[error("embedding unavailable: {reason}")]
    EmbeddingUnavailable { reason: String },

    #[error("invalid coordinate (lat {lat}, lon {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("unknown blood type '{0}' (expected one of A+, A-, B+, B-, O+, O-, AB+, AB-)")]
    UnknownBloodType(String),

    #[error("candidate store failed: {0}")]
    Store(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },
}
