//! Create tickets table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_parking_spots::ParkingSpots;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tickets::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Tickets::VehicleRegistration)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tickets::SpotId).integer().not_null())
                    .col(
                        ColumnDef::new(Tickets::EntryTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tickets::ExitTime).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Tickets::Price)
                            .string_len(32)
                            .not_null()
                            .default("0"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_parking_spot")
                            .from(Tickets::Table, Tickets::SpotId)
                            .to(ParkingSpots::Table, ParkingSpots::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Open-ticket lookup and loyalty counting both go by vehicle
        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_vehicle_registration")
                    .table(Tickets::Table)
                    .col(Tickets::VehicleRegistration)
                    .to_owned(),
            )
            .await?;

        // At most one open ticket per vehicle
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_tickets_open_vehicle \
                 ON tickets (vehicle_registration) WHERE exit_time IS NULL",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Tickets {
    Table,
    Id,
    VehicleRegistration,
    SpotId,
    EntryTime,
    ExitTime,
    Price,
}
