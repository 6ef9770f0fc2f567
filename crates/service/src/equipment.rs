//! Equipment service.
//!
//! Placement payloads are validated before any database work. Every
//! placement target is share-locked for the rest of the transaction so a
//! concurrent guarded delete of the target either sees the new unit or
//! waits for it.
//!
//! Lock order: equipment rows first, then transports. Every path that links
//! a unit to a transport (`update` here, `TransportService::create` and
//! `TransportService::assign_equipment`) takes its equipment locks before
//! touching any transport row.

use fleet_core::conflict::ConflictReport;
use fleet_core::entity::EntityKind;
use fleet_core::pagination::{Page, PageRequest};
use fleet_core::placement::Placement;
use fleet_core::types::DbId;
use fleet_db::models::equipment::{CreateEquipment, Equipment, EquipmentFilter, UpdateEquipment};
use fleet_db::repositories::{ClientObjectRepo, EquipmentRepo, TransportRepo, WarehouseRepo};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::{not_found, ServiceResult};
use crate::guard;

const KIND: EntityKind = EntityKind::Equipment;

pub struct EquipmentService;

impl EquipmentService {
    /// Create a unit, optionally placed in one location.
    pub async fn create(pool: &PgPool, input: &CreateEquipment) -> ServiceResult<Equipment> {
        input.validate()?;
        let placement = input.placement_request().validate()?;

        let mut tx = pool.begin().await?;
        if let Some(target) = placement {
            lock_placement_target(&mut tx, target).await?;
        }
        let unit = EquipmentRepo::create(&mut tx, input, placement).await?;
        tx.commit().await?;

        tracing::info!(
            entity = KIND.label(),
            id = unit.id,
            placement = ?placement,
            "Created"
        );
        Ok(unit)
    }

    pub async fn get_by_id(
        pool: &PgPool,
        id: DbId,
        include_deleted: bool,
    ) -> ServiceResult<Equipment> {
        let mut conn = pool.acquire().await?;
        let found = if include_deleted {
            EquipmentRepo::find_by_id_include_deleted(&mut conn, id).await?
        } else {
            EquipmentRepo::find_by_id(&mut conn, id).await?
        };
        found.ok_or_else(|| not_found(KIND, id))
    }

    pub async fn list(
        pool: &PgPool,
        filter: &EquipmentFilter,
        page: &PageRequest,
    ) -> ServiceResult<Page<Equipment>> {
        let mut conn = pool.acquire().await?;
        Ok(EquipmentRepo::list(&mut conn, filter, page).await?)
    }

    /// Update attributes and, when a placement field is supplied, relocate.
    ///
    /// A unit moved off a transport is also removed from any transport's
    /// current-equipment slot other than its new one.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEquipment,
    ) -> ServiceResult<Equipment> {
        input.validate()?;
        let placement = input.placement_request().validate()?;

        let mut tx = pool.begin().await?;
        let current = EquipmentRepo::find_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        if let Some(target) = placement {
            lock_placement_target(&mut tx, target).await?;
        }

        let unit = EquipmentRepo::update(&mut tx, id, input, placement)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;

        if let Some(target) = placement {
            let keep = match target {
                Placement::Transport(transport_id) => Some(transport_id),
                _ => None,
            };
            let detached = TransportRepo::detach_equipment(&mut tx, id, keep).await?;
            if detached > 0 {
                tracing::debug!(id, detached, "Detached equipment from transports");
            }
        }
        tx.commit().await?;

        if placement.is_some() && placement != current.placement() {
            tracing::info!(
                entity = KIND.label(),
                id,
                from = ?current.placement(),
                to = ?placement,
                "Relocated"
            );
        } else {
            tracing::info!(entity = KIND.label(), id, "Updated");
        }
        Ok(unit)
    }

    /// Only attachment to a live transport blocks a delete; units at a
    /// client object or warehouse may be deleted.
    pub async fn check_delete_conflicts(pool: &PgPool, id: DbId) -> ServiceResult<ConflictReport> {
        guard::check_delete_conflicts(pool, KIND, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        guard::delete(pool, KIND, id).await
    }

    pub async fn restore(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        guard::restore(pool, KIND, id).await
    }
}

/// Resolve a placement target among live rows and share-lock it.
async fn lock_placement_target(
    conn: &mut PgConnection,
    target: Placement,
) -> ServiceResult<()> {
    let found = match target {
        Placement::Transport(id) => TransportRepo::find_for_share(conn, id).await?.is_some(),
        Placement::ClientObject(id) => ClientObjectRepo::find_for_share(conn, id).await?.is_some(),
        Placement::Warehouse(id) => WarehouseRepo::find_for_share(conn, id).await?.is_some(),
    };
    if found {
        Ok(())
    } else {
        let kind = match target {
            Placement::Transport(_) => EntityKind::Transport,
            Placement::ClientObject(_) => EntityKind::ClientObject,
            Placement::Warehouse(_) => EntityKind::Warehouse,
        };
        Err(not_found(kind, target.target_id()))
    }
}
