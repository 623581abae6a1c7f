//! SeaORM implementation of SpotInventory

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::domain::{ParkingSpot, ParkingType, SpotInventory, StorageResult};
use crate::infrastructure::database::entities::parking_spot::{self, SpotType};

pub struct SeaOrmSpotInventory {
    db: DatabaseConnection,
}

impl SeaOrmSpotInventory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn model_to_domain(m: parking_spot::Model) -> ParkingSpot {
    ParkingSpot {
        id: m.id,
        category: m.spot_type.into(),
        is_available: m.available,
    }
}

#[async_trait]
impl SpotInventory for SeaOrmSpotInventory {
    async fn find_next_available(&self, category: ParkingType) -> StorageResult<Option<i32>> {
        let model = parking_spot::Entity::find()
            .filter(parking_spot::Column::SpotType.eq(SpotType::from(category)))
            .filter(parking_spot::Column::Available.eq(true))
            .order_by_asc(parking_spot::Column::Id)
            .one(&self.db)
            .await?;
        Ok(model.map(|m| m.id))
    }

    async fn mark_occupied(&self, spot_id: i32) -> StorageResult<bool> {
        debug!("Claiming parking spot {}", spot_id);
        // Conditional update: only one caller can flip a free spot
        let result = parking_spot::Entity::update_many()
            .col_expr(parking_spot::Column::Available, Expr::value(false))
            .filter(parking_spot::Column::Id.eq(spot_id))
            .filter(parking_spot::Column::Available.eq(true))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn mark_available(&self, spot_id: i32) -> StorageResult<bool> {
        debug!("Releasing parking spot {}", spot_id);
        let result = parking_spot::Entity::update_many()
            .col_expr(parking_spot::Column::Available, Expr::value(true))
            .filter(parking_spot::Column::Id.eq(spot_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn count_available(&self, category: ParkingType) -> StorageResult<u64> {
        let count = parking_spot::Entity::find()
            .filter(parking_spot::Column::SpotType.eq(SpotType::from(category)))
            .filter(parking_spot::Column::Available.eq(true))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_support::migrated_memory_db;

    #[tokio::test]
    async fn seeded_spots_are_allocated_lowest_first() {
        let repo = SeaOrmSpotInventory::new(migrated_memory_db().await);

        assert_eq!(repo.count_available(ParkingType::Car).await.unwrap(), 3);
        assert_eq!(repo.count_available(ParkingType::Bike).await.unwrap(), 2);
        assert_eq!(repo.find_next_available(ParkingType::Car).await.unwrap(), Some(1));
        assert_eq!(repo.find_next_available(ParkingType::Bike).await.unwrap(), Some(4));

        let spot = parking_spot::Entity::find_by_id(4)
            .one(&repo.db)
            .await
            .unwrap()
            .map(model_to_domain)
            .unwrap();
        assert_eq!(spot, ParkingSpot::new(4, ParkingType::Bike, true));
    }

    #[tokio::test]
    async fn occupied_spot_cannot_be_claimed_twice() {
        let repo = SeaOrmSpotInventory::new(migrated_memory_db().await);

        assert!(repo.mark_occupied(1).await.unwrap());
        assert!(!repo.mark_occupied(1).await.unwrap());
        assert_eq!(repo.find_next_available(ParkingType::Car).await.unwrap(), Some(2));

        assert!(repo.mark_available(1).await.unwrap());
        assert_eq!(repo.find_next_available(ParkingType::Car).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn unknown_spot_is_not_touched() {
        let repo = SeaOrmSpotInventory::new(migrated_memory_db().await);
        assert!(!repo.mark_occupied(42).await.unwrap());
        assert!(!repo.mark_available(42).await.unwrap());
        assert_eq!(repo.count_available(ParkingType::Car).await.unwrap(), 3);
    }
}
