use crate::error::RankError;
use crate::geo::GeoPoint;
use crate::models::{BloodType, HospitalCandidate, Query, RankedResult};
use hemolink_config::RankingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Weights of the composite score terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub vector: f64,
    pub distance: f64,
    pub response: f64,
    pub rating: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            vector: 0.5,
            distance: 0.3,
            response: 0.1,
            rating: 0.1,
        }
    }
}

impl From<&RankingConfig> for ScoreWeights {
    fn from(config: &RankingConfig) -> Self {
        Self {
            vector: config.vector,
            distance: config.distance,
            response: config.response,
            rating: config.rating,
        }
    }
}

/// Why a candidate was left out of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    NoInventory { blood_type: BloodType },
    InvalidRating { rating: f64 },
    InvalidCoordinate { lat: f64, lon: f64 },
    InvalidResponseTime { minutes: f64 },
    InvalidVectorDistance { distance: f64 },
    MissingEmbedding,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::NoInventory { blood_type } => {
                write!(f, "no {} units in stock", blood_type)
            }
            ExclusionReason::InvalidRating { rating } => {
                write!(f, "rating must be > 0, got {}", rating)
            }
            ExclusionReason::InvalidCoordinate { lat, lon } => {
                write!(f, "coordinate out of range (lat {}, lon {})", lat, lon)
            }
            ExclusionReason::InvalidResponseTime { minutes } => {
                write!(f, "response time must be >= 0, got {}", minutes)
            }
            ExclusionReason::InvalidVectorDistance { distance } => {
                write!(f, "vector distance must be >= 0, got {}", distance)
            }
            ExclusionReason::MissingEmbedding => {
                write!(f, "no embedding to compare against the query")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub id: String,
    pub name: String,
    pub reason: ExclusionReason,
}

impl Exclusion {
    fn new(candidate: &HospitalCandidate, reason: ExclusionReason) -> Self {
        Self {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            reason,
        }
    }
}

/// Ordered results plus the candidates that could not be scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankOutcome {
    pub results: Vec<RankedResult>,
    pub exclusions: Vec<Exclusion>,
}

/// Composite scorer for the live ranking path. Lower scores rank first.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoreWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(ScoreWeights::from(config))
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// `rating` must be positive; callers screen candidates first.
    pub fn score(
        &self,
        vector_distance: f64,
        distance_km: f64,
        response_mins: f64,
        rating: f64,
    ) -> f64 {
        self.weights.vector * vector_distance
            + self.weights.distance * distance_km
            + self.weights.response * (response_mins / 60.0)
            + self.weights.rating * (1.0 / rating)
    }

    /// Scores every eligible candidate and returns at most `top_k` results
    /// in non-decreasing score order. Equal scores keep their input order.
    ///
    /// The pool carries no similarity signal, so a missing vector distance
    /// contributes 0.
    pub fn rank(
        &self,
        query: &Query,
        candidates: &[HospitalCandidate],
        top_k: usize,
    ) -> Result<RankOutcome, RankError> {
        self.rank_pool(query, candidates, top_k, false)
    }

    /// Like [`ScoringEngine::rank`] for a pool fetched against a query
    /// vector. Candidates without a vector distance are excluded with
    /// [`ExclusionReason::MissingEmbedding`].
    pub fn rank_with_similarity(
        &self,
        query: &Query,
        candidates: &[HospitalCandidate],
        top_k: usize,
    ) -> Result<RankOutcome, RankError> {
        self.rank_pool(query, candidates, top_k, true)
    }

    fn rank_pool(
        &self,
        query: &Query,
        candidates: &[HospitalCandidate],
        top_k: usize,
        require_vector: bool,
    ) -> Result<RankOutcome, RankError> {
        let origin = query.location()?;
        let mut outcome = RankOutcome::default();
        let mut scored: Vec<(f64, RankedResult)> = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            match screen(query.blood_type, candidate, &origin, require_vector) {
                Ok(distance) => {
                    let score = self.score(
                        candidate.vector_distance.unwrap_or(0.0),
                        distance,
                        candidate.avg_response_time_mins,
                        candidate.rating,
                    );
                    scored.push((score, RankedResult::new(candidate.clone(), distance, Some(score))));
                }
                Err(reason) => {
                    log_exclusion(candidate, &reason);
                    outcome.exclusions.push(Exclusion::new(candidate, reason));
                }
            }
        }

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        outcome.results = scored
            .into_iter()
            .take(top_k)
            .map(|(_, result)| result)
            .collect();

        debug!(
            query = %query.text,
            ranked = outcome.results.len(),
            excluded = outcome.exclusions.len(),
            "ranked candidates"
        );
        Ok(outcome)
    }

    /// Keeps the store's order and attaches requester distances without
    /// scoring. Used by the single-field baseline strategies, which do not
    /// apply the inventory precondition themselves.
    pub fn annotate(
        &self,
        query: &Query,
        candidates: &[HospitalCandidate],
        top_k: usize,
    ) -> Result<RankOutcome, RankError> {
        let origin = query.location()?;
        let mut outcome = RankOutcome::default();

        for candidate in candidates {
            if outcome.results.len() == top_k {
                break;
            }
            match candidate.location() {
                Ok(location) => {
                    let distance = origin.distance_km(&location);
                    outcome
                        .results
                        .push(RankedResult::new(candidate.clone(), distance, None));
                }
                Err(_) => {
                    let reason = ExclusionReason::InvalidCoordinate {
                        lat: candidate.latitude,
                        lon: candidate.longitude,
                    };
                    log_exclusion(candidate, &reason);
                    outcome.exclusions.push(Exclusion::new(candidate, reason));
                }
            }
        }

        Ok(outcome)
    }
}

/// Checks the preconditions for scoring and returns the requester distance.
fn screen(
    blood_type: BloodType,
    candidate: &HospitalCandidate,
    origin: &GeoPoint,
    require_vector: bool,
) -> Result<f64, ExclusionReason> {
    if candidate.units_of(blood_type) == 0 {
        return Err(ExclusionReason::NoInventory { blood_type });
    }
    if !(candidate.rating.is_finite() && candidate.rating > 0.0) {
        return Err(ExclusionReason::InvalidRating {
            rating: candidate.rating,
        });
    }
    let minutes = candidate.avg_response_time_mins;
    if !(minutes.is_finite() && minutes >= 0.0) {
        return Err(ExclusionReason::InvalidResponseTime { minutes });
    }
    match candidate.vector_distance {
        Some(distance) if !(distance.is_finite() && distance >= 0.0) => {
            return Err(ExclusionReason::InvalidVectorDistance { distance });
        }
        None if require_vector => return Err(ExclusionReason::MissingEmbedding),
        _ => {}
    }
    let location = candidate
        .location()
        .map_err(|_| ExclusionReason::InvalidCoordinate {
            lat: candidate.latitude,
            lon: candidate.longitude,
        })?;
    Ok(origin.distance_km(&location))
}

fn log_exclusion(candidate: &HospitalCandidate, reason: &ExclusionReason) {
    match reason {
        ExclusionReason::NoInventory { .. } => {
            debug!(id = %candidate.id, name = %candidate.name, "excluded: {}", reason)
        }
        _ => warn!(id = %candidate.id, name = %candidate.name, "excluded: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS_KM;
    use std::collections::BTreeMap;

    const DELHI: (f64, f64) = (28.6139, 77.2090);

    /// Degrees of latitude that span `km` along a meridian.
    fn lat_offset(km: f64) -> f64 {
        (km / EARTH_RADIUS_KM).to_degrees()
    }

    fn hospital(name: &str, km_north: f64, rating: f64, response: f64, units: u32) -> HospitalCandidate {
        let mut blood_inventory = BTreeMap::new();
        blood_inventory.insert(BloodType::OPos, units);
        HospitalCandidate {
            id: name.to_lowercase(),
            name: name.to_string(),
            city: "Delhi".to_string(),
            latitude: DELHI.0 + lat_offset(km_north),
            longitude: DELHI.1,
            rating,
            avg_response_time_mins: response,
            icu_beds_available: 2,
            blood_inventory,
            vector_distance: None,
        }
    }

    fn query() -> Query {
        Query::new("trauma emergency", BloodType::OPos, DELHI.0, DELHI.1)
    }

    #[test]
    fn test_end_to_end_two_candidates() {
        let mut a = hospital("A", 3.0, 4.5, 20.0, 12);
        a.icu_beds_available = 3;
        a.vector_distance = Some(0.1);
        let mut b = hospital("B", 20.0, 3.0, 45.0, 2);
        b.icu_beds_available = 0;
        b.vector_distance = Some(0.5);

        let engine = ScoringEngine::default();
        let outcome = engine.rank(&query(), &[b, a], 2).unwrap();

        let names: Vec<&str> = outcome.results.iter().map(|r| r.hospital.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        let expected_a = 0.5 * 0.1 + 0.3 * 3.0 + 0.1 * (20.0 / 60.0) + 0.1 * (1.0 / 4.5);
        let expected_b = 0.5 * 0.5 + 0.3 * 20.0 + 0.1 * 0.75 + 0.1 * (1.0 / 3.0);
        assert!((outcome.results[0].score.unwrap() - expected_a).abs() < 1e-6);
        assert!((outcome.results[1].score.unwrap() - expected_b).abs() < 1e-6);
        assert!((outcome.results[1].score.unwrap() - 6.358).abs() < 1e-3);
        assert_eq!(outcome.results[0].display_distance_km, 3.0);
        assert!(outcome.exclusions.is_empty());
    }

    #[test]
    fn test_zero_inventory_never_ranked() {
        let candidates = vec![
            hospital("Empty", 1.0, 5.0, 5.0, 0),
            hospital("Stocked", 10.0, 3.0, 30.0, 4),
        ];
        let outcome = ScoringEngine::default().rank(&query(), &candidates, 5).unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].hospital.name, "Stocked");
        assert_eq!(
            outcome.exclusions[0].reason,
            ExclusionReason::NoInventory {
                blood_type: BloodType::OPos
            }
        );
    }

    #[test]
    fn test_invalid_rating_is_excluded_and_reported() {
        let candidates = vec![
            hospital("Zero", 1.0, 0.0, 5.0, 5),
            hospital("Negative", 1.0, -2.0, 5.0, 5),
            hospital("Good", 2.0, 4.0, 5.0, 5),
        ];
        let outcome = ScoringEngine::default().rank(&query(), &candidates, 5).unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.exclusions.len(), 2);
        assert!(outcome
            .exclusions
            .iter()
            .all(|e| matches!(e.reason, ExclusionReason::InvalidRating { .. })));
    }

    #[test]
    fn test_top_k_and_sorted_scores() {
        let candidates: Vec<HospitalCandidate> = (0..10)
            .map(|i| hospital(&format!("H{i}"), (10 - i) as f64 * 2.0, 4.0, 15.0, 3))
            .collect();
        let outcome = ScoringEngine::default().rank(&query(), &candidates, 4).unwrap();
        assert_eq!(outcome.results.len(), 4);
        let scores: Vec<f64> = outcome.results.iter().filter_map(|r| r.score).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(outcome.results[0].hospital.name, "H9");
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let candidates = vec![
            hospital("First", 4.0, 4.0, 10.0, 3),
            hospital("Second", 4.0, 4.0, 10.0, 3),
            hospital("Third", 4.0, 4.0, 10.0, 3),
        ];
        let outcome = ScoringEngine::default().rank(&query(), &candidates, 3).unwrap();
        let names: Vec<&str> = outcome.results.iter().map(|r| r.hospital.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_empty_candidates_is_not_an_error() {
        let outcome = ScoringEngine::default().rank(&query(), &[], 5).unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.exclusions.is_empty());
    }

    #[test]
    fn test_invalid_requester_fails_fast() {
        let bad = Query::new("x", BloodType::OPos, 95.0, 0.0);
        let err = ScoringEngine::default()
            .rank(&bad, &[hospital("A", 1.0, 4.0, 5.0, 1)], 5)
            .unwrap_err();
        assert!(matches!(err, RankError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_invalid_candidate_coordinate_is_excluded() {
        let mut broken = hospital("Broken", 1.0, 4.0, 5.0, 5);
        broken.longitude = 200.0;
        let outcome = ScoringEngine::default()
            .rank(&query(), &[broken, hospital("Fine", 1.0, 4.0, 5.0, 5)], 5)
            .unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert!(matches!(
            outcome.exclusions[0].reason,
            ExclusionReason::InvalidCoordinate { .. }
        ));
    }

    #[test]
    fn test_annotate_preserves_order_without_scores() {
        let candidates = vec![
            hospital("Far", 30.0, 4.0, 5.0, 0),
            hospital("Near", 1.0, 4.0, 50.0, 5),
            hospital("Mid", 8.0, 4.0, 20.0, 5),
        ];
        let outcome = ScoringEngine::default().annotate(&query(), &candidates, 2).unwrap();
        let names: Vec<&str> = outcome.results.iter().map(|r| r.hospital.name.as_str()).collect();
        assert_eq!(names, vec!["Far", "Near"]);
        assert!(outcome.results.iter().all(|r| r.score.is_none()));
        assert!((outcome.results[0].distance_km - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_vector_distance_with_similarity() {
        let mut embedded = hospital("Embedded", 1.0, 4.0, 10.0, 5);
        embedded.vector_distance = Some(2.0);
        let bare = hospital("Bare", 1.0, 4.0, 10.0, 5);
        let pool = vec![bare, embedded];

        let outcome = ScoringEngine::default()
            .rank_with_similarity(&query(), &pool, 5)
            .unwrap();
        let names: Vec<&str> = outcome.results.iter().map(|r| r.hospital.name.as_str()).collect();
        assert_eq!(names, vec!["Embedded"]);
        assert_eq!(outcome.exclusions.len(), 1);
        assert_eq!(outcome.exclusions[0].name, "Bare");
        assert_eq!(outcome.exclusions[0].reason, ExclusionReason::MissingEmbedding);

        // Without a query vector the term is simply dropped.
        let outcome = ScoringEngine::default().rank(&query(), &pool, 5).unwrap();
        assert_eq!(outcome.results[0].hospital.name, "Bare");
        assert!(outcome.exclusions.is_empty());
    }

    #[test]
    fn test_custom_weights_from_config() {
        let config = RankingConfig {
            vector: 0.0,
            distance: 1.0,
            response: 0.0,
            rating: 0.0,
            ..Default::default()
        };
        let engine = ScoringEngine::from_config(&config);
        assert_eq!(engine.score(0.9, 2.5, 60.0, 1.0), 2.5);
    }
}
