use crate::profile::profile_text;
use crate::record::HospitalRecord;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use hemolink_core::traits::{CandidateOrder, CandidateStore, Embedder, FetchRequest};
use hemolink_core::HospitalCandidate;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// In-memory candidate store over a JSON hospital snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    records: Vec<HospitalRecord>,
}

impl SnapshotStore {
    pub fn from_records(records: Vec<HospitalRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        let records: Vec<HospitalRecord> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
        info!(path = %path.display(), hospitals = records.len(), "loaded snapshot");
        Ok(Self { records })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(path, json).with_context(|| format!("failed to write snapshot {}", path.display()))
    }

    pub fn records(&self) -> &[HospitalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn missing_embeddings(&self) -> usize {
        self.records.iter().filter(|r| r.embedding.is_none()).count()
    }

    /// Embeds the profile text of every record without an embedding.
    /// Returns the number of records updated.
    pub async fn embed_missing(&mut self, embedder: &dyn Embedder, batch_size: usize) -> Result<usize> {
        let pending: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.embedding.is_none())
            .map(|(idx, _)| idx)
            .collect();

        for chunk in pending.chunks(batch_size.max(1)) {
            let texts: Vec<String> = chunk.iter().map(|&idx| profile_text(&self.records[idx])).collect();
            let vectors = embedder.embed_batch(&texts).await?;
            if vectors.len() != chunk.len() {
                bail!("embedder returned {} vectors for {} profiles", vectors.len(), chunk.len());
            }
            for (&idx, vector) in chunk.iter().zip(vectors) {
                self.records[idx].embedding = Some(vector);
            }
            debug!(done = chunk.len(), "embedded profile batch");
        }

        Ok(pending.len())
    }
}

/// Euclidean distance, matching the `<->` operator of the original vector store.
fn l2_distance(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(anyhow!(
            "embedding dimension mismatch: query has {}, hospital has {}",
            a.len(),
            b.len()
        ));
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum();
    Ok(sum.sqrt())
}

#[async_trait]
impl CandidateStore for SnapshotStore {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<HospitalCandidate>> {
        let filter = &request.filter;
        let mut unembedded = 0usize;
        let mut candidates = Vec::new();

        for record in &self.records {
            if let Some(city) = &filter.city {
                if !record.in_city(city) {
                    continue;
                }
            }
            if let Some(blood_type) = filter.blood_type {
                if record.units_of(blood_type) == 0 {
                    continue;
                }
            }

            let vector_distance = match (&request.query_vector, &record.embedding) {
                (Some(query), Some(embedding)) => Some(
                    l2_distance(query, embedding).with_context(|| format!("hospital {}", record.id))?,
                ),
                (Some(_), None) => {
                    unembedded += 1;
                    None
                }
                _ => None,
            };
            candidates.push(record.to_candidate(vector_distance));
        }

        if unembedded > 0 {
            warn!(count = unembedded, "hospitals without embeddings in a similarity fetch");
        }

        match request.order {
            CandidateOrder::ResponseTimeAsc => {
                candidates.sort_by(|a, b| a.avg_response_time_mins.total_cmp(&b.avg_response_time_mins))
            }
            CandidateOrder::RatingDesc => candidates.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            // Rows without an embedding sort last.
            CandidateOrder::VectorDistance => candidates.sort_by(|a, b| {
                match (a.vector_distance, b.vector_distance) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
            }),
            CandidateOrder::Unordered => {}
        }

        if let Some(limit) = request.limit {
            candidates.truncate(limit);
        }
        Ok(candidates)
    }
}
