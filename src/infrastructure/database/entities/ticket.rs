//! Ticket entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub vehicle_registration: String,

    pub spot_id: i32,

    pub entry_time: DateTimeUtc,

    /// NULL while the vehicle is still parked
    #[sea_orm(nullable)]
    pub exit_time: Option<DateTimeUtc>,

    /// Decimal amount as text, e.g. "1.425"
    pub price: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parking_spot::Entity",
        from = "Column::SpotId",
        to = "super::parking_spot::Column::Id"
    )]
    ParkingSpot,
}

impl Related<super::parking_spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingSpot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
