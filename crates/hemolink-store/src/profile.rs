//! Text profile embedded for each hospital.

use crate::record::HospitalRecord;
use hemolink_core::BloodType;

pub fn profile_text(record: &HospitalRecord) -> String {
    let blood = BloodType::ALL
        .iter()
        .map(|bt| format!("{} {}", bt, record.units_of(*bt)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Hospital name: {}\nCity: {}\nTrauma level: {}\nRating: {}\nAverage response time: {} minutes\nICU beds available: {}\nBlood availability: {}\n",
        record.name,
        record.city.as_deref().unwrap_or("Unknown"),
        record.trauma_level,
        record.rating,
        record.avg_response_time_mins,
        record.icu_beds_available,
        blood
    )
}
