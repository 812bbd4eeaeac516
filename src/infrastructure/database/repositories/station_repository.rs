//! SeaORM implementation of StationRepository

use async_trait::async_trait;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, ColumnTrait,
    DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set, SqlErr,
};
use tracing::debug;

use crate::domain::station::{
    fold_address, ChargerType, LocationRange, Station, StationDetails, StationRepository, StationSortField,
    StationStatus,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::station;
use crate::shared::{PageRequest, PaginatedResult, SortDirection};

pub struct SeaOrmStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn list(&self, query: Select<station::Entity>) -> DomainResult<Vec<Station>> {
        let models = query
            .order_by_asc(station::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(station_from_model).collect())
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn charger_type_to_entity(value: ChargerType) -> station::ChargerType {
    match value {
        ChargerType::Ac => station::ChargerType::Ac,
        ChargerType::DcFast => station::ChargerType::DcFast,
    }
}

fn charger_type_from_entity(value: station::ChargerType) -> ChargerType {
    match value {
        station::ChargerType::Ac => ChargerType::Ac,
        station::ChargerType::DcFast => ChargerType::DcFast,
    }
}

fn status_to_entity(value: StationStatus) -> station::StationStatus {
    match value {
        StationStatus::Available => station::StationStatus::Available,
        StationStatus::InUse => station::StationStatus::InUse,
    }
}

fn status_from_entity(value: station::StationStatus) -> StationStatus {
    match value {
        station::StationStatus::Available => StationStatus::Available,
        station::StationStatus::InUse => StationStatus::InUse,
    }
}

fn station_from_model(model: station::Model) -> Station {
    Station {
        id: model.id,
        address: model.address,
        latitude: model.latitude,
        longitude: model.longitude,
        charger_type: charger_type_from_entity(model.charger_type),
        charging_points: model.charging_points,
        status: status_from_entity(model.status),
    }
}

fn sort_column(field: StationSortField) -> station::Column {
    match field {
        StationSortField::Id => station::Column::Id,
        StationSortField::Address => station::Column::Address,
        StationSortField::Latitude => station::Column::Latitude,
        StationSortField::Longitude => station::Column::Longitude,
        StationSortField::ChargerType => station::Column::ChargerType,
        StationSortField::ChargingPoints => station::Column::ChargingPoints,
        StationSortField::Status => station::Column::Status,
    }
}

/// Escapes LIKE wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Unique-index violations mean another row already holds the address.
fn write_err(e: DbErr, address: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::DuplicateAddress(address.to_string())
        }
        _ => e.into(),
    }
}

// ── StationRepository impl ──────────────────────────────────────

#[async_trait]
impl StationRepository for SeaOrmStationRepository {
    async fn find_all(&self) -> DomainResult<Vec<Station>> {
        self.list(station::Entity::find()).await
    }

    async fn find_page(&self, request: &PageRequest) -> DomainResult<PaginatedResult<Station>> {
        let (field, direction) = StationSortField::resolve(request.sort.as_ref())?;
        let order = match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };

        let total = station::Entity::find().count(&self.db).await?;

        let mut query = station::Entity::find().order_by(sort_column(field), order);
        if field != StationSortField::Id {
            query = query.order_by_asc(station::Column::Id);
        }

        let models = query
            .offset(request.offset())
            .limit(request.limit)
            .all(&self.db)
            .await?;

        let items = models.into_iter().map(station_from_model).collect();
        Ok(PaginatedResult::new(items, total, request.page, request.limit))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>> {
        let model = station::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(station_from_model))
    }

    async fn insert(&self, details: StationDetails) -> DomainResult<Station> {
        debug!(address = %details.address, "Inserting station");

        let model = station::ActiveModel {
            id: NotSet,
            address: Set(details.address.clone()),
            address_folded: Set(fold_address(&details.address)),
            latitude: Set(details.latitude),
            longitude: Set(details.longitude),
            charger_type: Set(charger_type_to_entity(details.charger_type)),
            charging_points: Set(details.charging_points),
            status: Set(status_to_entity(details.status)),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, &details.address))?;

        Ok(station_from_model(inserted))
    }

    async fn update(&self, station: Station) -> DomainResult<Station> {
        debug!(station_id = station.id, "Updating station");

        let model = station::ActiveModel {
            id: Unchanged(station.id),
            address: Set(station.address.clone()),
            address_folded: Set(fold_address(&station.address)),
            latitude: Set(station.latitude),
            longitude: Set(station.longitude),
            charger_type: Set(charger_type_to_entity(station.charger_type)),
            charging_points: Set(station.charging_points),
            status: Set(status_to_entity(station.status)),
        };

        let updated = model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => DomainError::station_not_found(station.id),
            other => write_err(other, &station.address),
        })?;

        Ok(station_from_model(updated))
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<()> {
        let result = station::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::station_not_found(id));
        }
        Ok(())
    }

    async fn exists_by_address(&self, address: &str) -> DomainResult<bool> {
        let count = station::Entity::find()
            .filter(station::Column::Address.eq(address))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn exists_by_id(&self, id: i32) -> DomainResult<bool> {
        let count = station::Entity::find()
            .filter(station::Column::Id.eq(id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(station::Entity::find().count(&self.db).await?)
    }

    async fn count_by_status(&self, status: StationStatus) -> DomainResult<u64> {
        let count = station::Entity::find()
            .filter(station::Column::Status.eq(status_to_entity(status)))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn find_by_charger_type(&self, charger_type: ChargerType) -> DomainResult<Vec<Station>> {
        self.list(
            station::Entity::find()
                .filter(station::Column::ChargerType.eq(charger_type_to_entity(charger_type))),
        )
        .await
    }

    async fn find_by_status(&self, status: StationStatus) -> DomainResult<Vec<Station>> {
        self.list(station::Entity::find().filter(station::Column::Status.eq(status_to_entity(status))))
            .await
    }

    async fn find_by_charging_points_at_least(
        &self,
        min_points: i32,
    ) -> DomainResult<Vec<Station>> {
        self.list(station::Entity::find().filter(station::Column::ChargingPoints.gte(min_points)))
            .await
    }

    async fn find_by_address_containing_ignore_case(
        &self,
        needle: &str,
    ) -> DomainResult<Vec<Station>> {
        // Both sides are folded in Rust; SQLite's LOWER() only knows ASCII.
        let pattern = format!("%{}%", escape_like(&fold_address(needle)));
        self.list(
            station::Entity::find()
                .filter(station::Column::AddressFolded.like(LikeExpr::new(pattern).escape('\\'))),
        )
        .await
    }

    async fn find_by_location_within_range(
        &self,
        range: LocationRange,
    ) -> DomainResult<Vec<Station>> {
        self.list(
            station::Entity::find()
                .filter(station::Column::Latitude.between(range.min_lat, range.max_lat))
                .filter(station::Column::Longitude.between(range.min_lon, range.max_lon)),
        )
        .await
    }
}
