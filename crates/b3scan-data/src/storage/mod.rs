//! 영속 저장소.

pub mod snapshots;

pub use snapshots::{RunRecord, SnapshotRepository};
