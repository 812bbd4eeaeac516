//! Charging station entity

use sea_orm::entity::prelude::*;

/// Charger type as stored (`AC`, `DC_FAST`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ChargerType {
    #[sea_orm(string_value = "AC")]
    Ac,
    #[sea_orm(string_value = "DC_FAST")]
    DcFast,
}

/// Station status as stored (`AVAILABLE`, `IN_USE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum StationStatus {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "IN_USE")]
    InUse,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "charging_stations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub address: String,

    /// Lowercased address, matched by the case-insensitive search
    pub address_folded: String,

    pub latitude: f64,
    pub longitude: f64,
    pub charger_type: ChargerType,
    pub charging_points: i32,
    pub status: StationStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
