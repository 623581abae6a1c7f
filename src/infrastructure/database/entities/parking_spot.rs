//! Parking spot entity

use sea_orm::entity::prelude::*;

use crate::domain::ParkingType;

/// Spot type as stored in the `spot_type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum SpotType {
    #[sea_orm(string_value = "CAR")]
    Car,
    #[sea_orm(string_value = "BIKE")]
    Bike,
}

impl From<SpotType> for ParkingType {
    fn from(value: SpotType) -> Self {
        match value {
            SpotType::Car => ParkingType::Car,
            SpotType::Bike => ParkingType::Bike,
        }
    }
}

impl From<ParkingType> for SpotType {
    fn from(value: ParkingType) -> Self {
        match value {
            ParkingType::Car => SpotType::Car,
            ParkingType::Bike => SpotType::Bike,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "parking_spots")]
pub struct Model {
    /// Spot number, assigned at facility setup
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub spot_type: SpotType,

    pub available: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket::Entity")]
    Tickets,
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
