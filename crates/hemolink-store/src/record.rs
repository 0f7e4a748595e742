use hemolink_core::{BloodType, HospitalCandidate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the enriched hospital export (`processed_hospitals.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_trauma_level")]
    pub trauma_level: u8,
    pub rating: f64,
    pub avg_response_time_mins: f64,
    #[serde(default)]
    pub icu_beds_available: u32,
    #[serde(default)]
    pub verified_status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub blood_inventory: BTreeMap<BloodType, u32>,
    /// Profile embedding, filled in by [`crate::SnapshotStore::embed_missing`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

fn default_kind() -> String {
    "hospital".to_string()
}

fn default_trauma_level() -> u8 {
    3
}

impl HospitalRecord {
    pub fn units_of(&self, blood_type: BloodType) -> u32 {
        self.blood_inventory.get(&blood_type).copied().unwrap_or(0)
    }

    pub fn in_city(&self, city: &str) -> bool {
        self.city
            .as_deref()
            .is_some_and(|c| c.trim().eq_ignore_ascii_case(city.trim()))
    }

    pub fn to_candidate(&self, vector_distance: Option<f64>) -> HospitalCandidate {
        HospitalCandidate {
            id: self.id.clone(),
            name: self.name.clone(),
            city: self.city.clone().unwrap_or_default(),
            latitude: self.lat,
            longitude: self.lon,
            rating: self.rating,
            avg_response_time_mins: self.avg_response_time_mins,
            icu_beds_available: self.icu_beds_available,
            blood_inventory: self.blood_inventory.clone(),
            vector_distance,
        }
    }
}
