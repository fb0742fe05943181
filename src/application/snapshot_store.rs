// Snapshot store trait for the last rendered dataset
use crate::domain::measurement::Dataset;
use async_trait::async_trait;

/// Single-slot, durable cell holding the dataset rendered by the last refresh.
///
/// Implementations never fail towards the caller: an absent or unreadable slot
/// loads as an empty dataset and write failures are only logged, so a broken
/// store degrades to every row looking changed.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self) -> Dataset;

    /// Overwrite the slot; last write wins.
    async fn save(&self, dataset: &Dataset);
}
