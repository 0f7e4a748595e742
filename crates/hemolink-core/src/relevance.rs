//! Heuristic relevance labels for the evaluation path.
//!
//! Grades depend only on distance, inventory and ICU capacity, never on the
//! composite score being evaluated.

use crate::models::{BloodType, RankedResult};
use hemolink_config::RelevanceConfig;

pub const MAX_GRADE: u8 = 7;

#[derive(Debug, Clone)]
pub struct RelevanceJudge {
    near_km: f64,
    mid_km: f64,
    blood_units_high: u32,
    icu_beds_high: u32,
}

impl Default for RelevanceJudge {
    fn default() -> Self {
        Self::from_config(&RelevanceConfig::default())
    }
}

impl RelevanceJudge {
    pub fn from_config(config: &RelevanceConfig) -> Self {
        Self {
            near_km: config.near_km,
            mid_km: config.mid_km,
            blood_units_high: config.blood_units_high,
            icu_beds_high: config.icu_beds_high,
        }
    }

    /// Additive rubric: distance 3/1/0, blood units 2/1/0, ICU beds 2/1/0.
    pub fn grade(&self, distance_km: f64, blood_units: u32, icu_beds: u32) -> u8 {
        let distance_points = if distance_km < self.near_km {
            3
        } else if distance_km < self.mid_km {
            1
        } else {
            0
        };
        distance_points + tiered(blood_units, self.blood_units_high) + tiered(icu_beds, self.icu_beds_high)
    }

    pub fn grade_result(&self, result: &RankedResult, blood_type: BloodType) -> u8 {
        self.grade(
            result.distance_km,
            result.hospital.units_of(blood_type),
            result.hospital.icu_beds_available,
        )
    }

    /// Grades a run in place and returns the grade sequence in rank order.
    pub fn judge(&self, results: &mut [RankedResult], blood_type: BloodType) -> Vec<u8> {
        results
            .iter_mut()
            .map(|result| {
                let grade = self.grade_result(result, blood_type);
                result.relevance = Some(grade);
                grade
            })
            .collect()
    }
}

fn tiered(value: u32, high: u32) -> u8 {
    if value >= high {
        2
    } else if value > 0 {
        1
    } else {
        0
    }
}

/// Relevant for reciprocal-rank purposes.
pub fn is_relevant(grade: u8) -> bool {
    grade > 0
}

/// Binary check used by Precision@K: stock of the requested type and at
/// least one free ICU bed.
pub fn is_operationally_relevant(result: &RankedResult, blood_type: BloodType) -> bool {
    result.hospital.units_of(blood_type) > 0 && result.hospital.icu_beds_available > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HospitalCandidate;
    use std::collections::BTreeMap;

    fn result(distance_km: f64, units: u32, icu: u32) -> RankedResult {
        let mut blood_inventory = BTreeMap::new();
        blood_inventory.insert(BloodType::ONeg, units);
        let hospital = HospitalCandidate {
            id: "h".into(),
            name: "H".into(),
            city: "Delhi".into(),
            latitude: 28.6,
            longitude: 77.2,
            rating: 4.0,
            avg_response_time_mins: 10.0,
            icu_beds_available: icu,
            blood_inventory,
            vector_distance: None,
        };
        RankedResult::new(hospital, distance_km, None)
    }

    #[test]
    fn test_band_edges() {
        let judge = RelevanceJudge::default();
        assert_eq!(judge.grade(4.99, 0, 0), 3);
        assert_eq!(judge.grade(5.0, 0, 0), 1);
        assert_eq!(judge.grade(14.99, 0, 0), 1);
        assert_eq!(judge.grade(15.0, 0, 0), 0);
        assert_eq!(judge.grade(100.0, 9, 0), 1);
        assert_eq!(judge.grade(100.0, 10, 0), 2);
        assert_eq!(judge.grade(100.0, 0, 4), 1);
        assert_eq!(judge.grade(100.0, 0, 5), 2);
    }

    #[test]
    fn test_max_grade() {
        assert_eq!(RelevanceJudge::default().grade(0.0, 50, 20), MAX_GRADE);
    }

    #[test]
    fn test_judge_fills_grades() {
        let judge = RelevanceJudge::default();
        let mut run = vec![result(3.0, 12, 3), result(20.0, 2, 0), result(40.0, 0, 0)];
        let grades = judge.judge(&mut run, BloodType::ONeg);
        assert_eq!(grades, vec![6, 1, 0]);
        assert_eq!(run[0].relevance, Some(6));
        assert_eq!(run[2].relevance, Some(0));
        assert!(is_relevant(grades[1]));
        assert!(!is_relevant(grades[2]));
    }

    #[test]
    fn test_operational_relevance() {
        assert!(is_operationally_relevant(&result(50.0, 1, 1), BloodType::ONeg));
        assert!(!is_operationally_relevant(&result(1.0, 0, 9), BloodType::ONeg));
        assert!(!is_operationally_relevant(&result(1.0, 9, 0), BloodType::ONeg));
        assert!(!is_operationally_relevant(&result(1.0, 9, 9), BloodType::APos));
    }

    #[test]
    fn test_custom_thresholds() {
        let judge = RelevanceJudge::from_config(&RelevanceConfig {
            near_km: 2.0,
            mid_km: 8.0,
            blood_units_high: 4,
            icu_beds_high: 2,
        });
        assert_eq!(judge.grade(3.0, 4, 2), 5);
    }
}
