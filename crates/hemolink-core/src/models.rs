use crate::error::RankError;
use crate::geo::{round_km, GeoPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APos,
        BloodType::ANeg,
        BloodType::BPos,
        BloodType::BNeg,
        BloodType::OPos,
        BloodType::ONeg,
        BloodType::AbPos,
        BloodType::AbNeg,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            BloodType::APos => "A+",
            BloodType::ANeg => "A-",
            BloodType::BPos => "B+",
            BloodType::BNeg => "B-",
            BloodType::OPos => "O+",
            BloodType::ONeg => "O-",
            BloodType::AbPos => "AB+",
            BloodType::AbNeg => "AB-",
        }
    }

    /// Inventory column name, e.g. `blood_ab_neg`.
    pub fn column(&self) -> String {
        let code = self.code();
        let (group, sign) = code.split_at(code.len() - 1);
        let suffix = if sign == "+" { "pos" } else { "neg" };
        format!("blood_{}_{}", group.to_lowercase(), suffix)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BloodType {
    type Err = RankError;

    /// Accepts codes (`O+`, `ab-`) and column names (`blood_o_pos`, `ab_neg`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let normalized = lowered.strip_prefix("blood_").unwrap_or(lowered.as_str());
        BloodType::ALL
            .into_iter()
            .find(|bt| {
                let column = bt.column();
                normalized == bt.code().to_lowercase()
                    || normalized == column.trim_start_matches("blood_")
            })
            .ok_or_else(|| RankError::UnknownBloodType(s.to_string()))
    }
}

/// A hospital row considered for ranking. Read-only once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalCandidate {
    pub id: String,
    pub name: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    pub avg_response_time_mins: f64,
    pub icu_beds_available: u32,
    #[serde(default)]
    pub blood_inventory: BTreeMap<BloodType, u32>,
    /// Embedding distance to the current query; smaller is more similar.
    /// Present only when a similarity search was executed.
    #[serde(default)]
    pub vector_distance: Option<f64>,
}

impl HospitalCandidate {
    pub fn units_of(&self, blood_type: BloodType) -> u32 {
        self.blood_inventory.get(&blood_type).copied().unwrap_or(0)
    }

    pub fn location(&self) -> Result<GeoPoint, RankError> {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// A single ranking or evaluation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub blood_type: BloodType,
    /// `None` means global scope.
    #[serde(default)]
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Query {
    pub fn new(text: impl Into<String>, blood_type: BloodType, latitude: f64, longitude: f64) -> Self {
        Self {
            text: text.into(),
            blood_type,
            city: None,
            latitude,
            longitude,
        }
    }

    pub fn in_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn location(&self) -> Result<GeoPoint, RankError> {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// One scored and ordered output item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub hospital: HospitalCandidate,
    /// Unrounded distance to the requester, in km.
    pub distance_km: f64,
    /// `distance_km` rounded to two decimals.
    pub display_distance_km: f64,
    /// Composite score (lower is better). `None` for baseline strategies
    /// that order by a single field.
    pub score: Option<f64>,
    /// Graded relevance, filled in on the evaluation path only.
    #[serde(default)]
    pub relevance: Option<u8>,
}

impl RankedResult {
    pub fn new(hospital: HospitalCandidate, distance_km: f64, score: Option<f64>) -> Self {
        Self {
            hospital,
            distance_km,
            display_distance_km: round_km(distance_km),
            score,
            relevance: None,
        }
    }
}
