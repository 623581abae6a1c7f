//! Create parking_spots table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Initial facility layout: three car spots, two bike spots
const SEED_SPOTS: [(i32, &str); 5] = [(1, "CAR"), (2, "CAR"), (3, "CAR"), (4, "BIKE"), (5, "BIKE")];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingSpots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingSpots::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::SpotType)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // Allocation scans free spots per type
        manager
            .create_index(
                Index::create()
                    .name("idx_parking_spots_type_available")
                    .table(ParkingSpots::Table)
                    .col(ParkingSpots::SpotType)
                    .col(ParkingSpots::Available)
                    .to_owned(),
            )
            .await?;

        let mut insert = Query::insert()
            .into_table(ParkingSpots::Table)
            .columns([
                ParkingSpots::Id,
                ParkingSpots::SpotType,
                ParkingSpots::Available,
            ])
            .to_owned();
        for (id, spot_type) in SEED_SPOTS {
            insert.values_panic([id.into(), spot_type.into(), true.into()]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSpots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingSpots {
    Table,
    Id,
    SpotType,
    Available,
}
