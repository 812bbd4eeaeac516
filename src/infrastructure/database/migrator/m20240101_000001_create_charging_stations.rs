//! Create charging_stations table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChargingStations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargingStations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChargingStations::Address).string().not_null())
                    .col(
                        ColumnDef::new(ChargingStations::AddressFolded)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChargingStations::Latitude).double().not_null())
                    .col(ColumnDef::new(ChargingStations::Longitude).double().not_null())
                    .col(
                        ColumnDef::new(ChargingStations::ChargerType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChargingStations::ChargingPoints)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChargingStations::Status)
                            .string_len(16)
                            .not_null()
                            .default("AVAILABLE"),
                    )
                    .to_owned(),
            )
            .await?;

        // Backstop for the service-level uniqueness check under concurrent writes
        manager
            .create_index(
                Index::create()
                    .name("idx_charging_stations_address")
                    .table(ChargingStations::Table)
                    .col(ChargingStations::Address)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_charging_stations_status")
                    .table(ChargingStations::Table)
                    .col(ChargingStations::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChargingStations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ChargingStations {
    Table,
    Id,
    Address,
    AddressFolded,
    Latitude,
    Longitude,
    ChargerType,
    ChargingPoints,
    Status,
}
