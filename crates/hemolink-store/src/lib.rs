pub mod profile;
pub mod record;
pub mod snapshot;

pub use record::HospitalRecord;
pub use snapshot::SnapshotStore;
