use anyhow::Result;
use async_trait::async_trait;
use hemolink_core::traits::{CandidateFilter, CandidateOrder, CandidateStore, Embedder, FetchRequest};
use hemolink_core::BloodType;
use hemolink_store::SnapshotStore;
use std::io::Write;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"[
  {"id": "a", "name": "Apollo", "lat": 28.56, "lon": 77.28, "city": "Delhi",
   "rating": 4.8, "avg_response_time_mins": 35, "icu_beds_available": 6,
   "blood_inventory": {"O+": 12, "B-": 0}, "embedding": [1.0, 0.0]},
  {"id": "b", "name": "Batra", "lat": 28.50, "lon": 77.23, "city": "delhi",
   "rating": 3.9, "avg_response_time_mins": 12, "icu_beds_available": 0,
   "blood_inventory": {"O+": 0, "B-": 5}, "embedding": [0.0, 1.0]},
  {"id": "c", "name": "Cooper", "lat": 19.10, "lon": 72.84, "city": "Mumbai",
   "rating": 4.1, "avg_response_time_mins": 20, "icu_beds_available": 2,
   "blood_inventory": {"O+": 3}, "embedding": [0.9, 0.1]},
  {"id": "d", "name": "Dayanand", "lat": 30.90, "lon": 75.84, "city": "Ludhiana",
   "rating": 4.5, "avg_response_time_mins": 50, "icu_beds_available": 1,
   "blood_inventory": {"O+": 8}}
]"#;

fn write_snapshot() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();
    file
}

fn ids(candidates: &[hemolink_core::HospitalCandidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.id.as_str()).collect()
}

fn request(filter: CandidateFilter, order: CandidateOrder) -> FetchRequest {
    FetchRequest {
        filter,
        order,
        query_vector: None,
        limit: None,
    }
}

#[tokio::test]
async fn test_blood_filter_and_response_order() {
    let file = write_snapshot();
    let store = SnapshotStore::load(file.path()).unwrap();
    assert_eq!(store.len(), 4);

    let filter = CandidateFilter {
        city: None,
        blood_type: Some(BloodType::OPos),
    };
    let rows = store
        .fetch(&request(filter, CandidateOrder::ResponseTimeAsc))
        .await
        .unwrap();
    assert_eq!(ids(&rows), vec!["c", "a", "d"]);
}

#[tokio::test]
async fn test_rating_order_with_limit() {
    let store = SnapshotStore::load(write_snapshot().path()).unwrap();
    let mut req = request(
        CandidateFilter {
            city: None,
            blood_type: Some(BloodType::OPos),
        },
        CandidateOrder::RatingDesc,
    );
    req.limit = Some(2);
    let rows = store.fetch(&req).await.unwrap();
    assert_eq!(ids(&rows), vec!["a", "d"]);
}

#[tokio::test]
async fn test_city_filter_is_case_insensitive() {
    let store = SnapshotStore::load(write_snapshot().path()).unwrap();
    let filter = CandidateFilter {
        city: Some("DELHI".to_string()),
        blood_type: None,
    };
    let rows = store.fetch(&request(filter, CandidateOrder::Unordered)).await.unwrap();
    assert_eq!(ids(&rows), vec!["a", "b"]);
}

#[tokio::test]
async fn test_vector_order_puts_unembedded_last() {
    let store = SnapshotStore::load(write_snapshot().path()).unwrap();
    let mut req = request(CandidateFilter::default(), CandidateOrder::VectorDistance);
    req.query_vector = Some(vec![1.0, 0.0]);
    let rows = store.fetch(&req).await.unwrap();

    assert_eq!(ids(&rows), vec!["a", "c", "b", "d"]);
    assert_eq!(rows[0].vector_distance, Some(0.0));
    assert!(rows[3].vector_distance.is_none());
}

#[tokio::test]
async fn test_dimension_mismatch_is_error() {
    let store = SnapshotStore::load(write_snapshot().path()).unwrap();
    let mut req = request(CandidateFilter::default(), CandidateOrder::VectorDistance);
    req.query_vector = Some(vec![1.0, 0.0, 0.0]);
    assert!(store.fetch(&req).await.is_err());
}

#[test]
fn test_missing_file_has_context() {
    let err = SnapshotStore::load(std::path::Path::new("/no/such/snapshot.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read snapshot"));
}

struct LengthEmbedder;

#[async_trait]
impl Embedder for LengthEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![text.len() as f32, 1.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::new();
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

#[tokio::test]
async fn test_embed_missing_and_save_round_trip() {
    let file = write_snapshot();
    let mut store = SnapshotStore::load(file.path()).unwrap();
    assert_eq!(store.missing_embeddings(), 1);

    let updated = store.embed_missing(&LengthEmbedder, 8).await.unwrap();
    assert_eq!(updated, 1);
    assert_eq!(store.missing_embeddings(), 0);

    let out = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    store.save(out.path()).unwrap();
    let reloaded = SnapshotStore::load(out.path()).unwrap();
    assert_eq!(reloaded.missing_embeddings(), 0);
    assert_eq!(reloaded.records()[3].embedding.as_ref().map(|e| e.len()), Some(2));
}
