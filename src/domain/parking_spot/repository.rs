//! Spot inventory interface

use async_trait::async_trait;

use super::model::ParkingType;
use crate::shared::errors::StorageResult;

#[async_trait]
pub trait SpotInventory: Send + Sync {
    /// Lowest-numbered free spot of the category, if any
    async fn find_next_available(&self, category: ParkingType) -> StorageResult<Option<i32>>;

    /// Claims the spot. Returns `false` when the spot is unknown or already
    /// occupied; the check and the write happen as one step.
    async fn mark_occupied(&self, spot_id: i32) -> StorageResult<bool>;

    /// Returns the spot to the free pool. `false` when the spot is unknown.
    async fn mark_available(&self, spot_id: i32) -> StorageResult<bool>;

    async fn count_available(&self, category: ParkingType) -> StorageResult<u64>;
}
