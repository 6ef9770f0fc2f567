//! Transport service, including driver and equipment assignment.

use fleet_core::conflict::ConflictReport;
use fleet_core::entity::EntityKind;
use fleet_core::pagination::{Page, PageRequest};
use fleet_core::placement::Placement;
use fleet_core::types::DbId;
use fleet_db::models::transport::{CreateTransport, Transport, TransportFilter, UpdateTransport};
use fleet_db::repositories::{DriverRepo, EquipmentRepo, TransportRepo};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::{duplicate, invalid, not_found, unique_violation, ServiceResult};
use crate::guard;

const KIND: EntityKind = EntityKind::Transport;

/// Lock attempts for an equipment assignment whose slot keeps moving.
const ASSIGN_ATTEMPTS: u32 = 3;

pub struct TransportService;

impl TransportService {
    /// Create a transport, optionally with a current driver and equipment.
    ///
    /// Initial equipment is placed on the new transport exactly as
    /// [`assign_equipment`](Self::assign_equipment) would.
    pub async fn create(pool: &PgPool, input: &CreateTransport) -> ServiceResult<Transport> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        if TransportRepo::exists_by_plate_no(&mut tx, &input.plate_no, None).await? {
            return Err(duplicate(KIND, "plate_no", &input.plate_no));
        }
        if let Some(driver_id) = input.current_driver_id {
            lock_driver(&mut tx, driver_id).await?;
        }
        if let Some(equipment_id) = input.current_equipment_id {
            EquipmentRepo::find_for_update(&mut tx, equipment_id)
                .await?
                .ok_or_else(|| not_found(EntityKind::Equipment, equipment_id))?;
        }

        let transport = TransportRepo::create(&mut tx, input)
            .await
            .map_err(|e| unique_violation(e, KIND, "plate_no", &input.plate_no))?;
        if let Some(equipment_id) = transport.current_equipment_id {
            load_equipment(&mut tx, transport.id, equipment_id).await?;
        }
        tx.commit().await?;

        tracing::info!(entity = KIND.label(), id = transport.id, plate_no = %transport.plate_no, "Created");
        Ok(transport)
    }

    pub async fn get_by_id(
        pool: &PgPool,
        id: DbId,
        include_deleted: bool,
    ) -> ServiceResult<Transport> {
        let mut conn = pool.acquire().await?;
        let found = if include_deleted {
            TransportRepo::find_by_id_include_deleted(&mut conn, id).await?
        } else {
            TransportRepo::find_by_id(&mut conn, id).await?
        };
        found.ok_or_else(|| not_found(KIND, id))
    }

    pub async fn list(
        pool: &PgPool,
        filter: &TransportFilter,
        page: &PageRequest,
    ) -> ServiceResult<Page<Transport>> {
        let mut conn = pool.acquire().await?;
        Ok(TransportRepo::list(&mut conn, filter, page).await?)
    }

    /// Update plate, make, capacity or status.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTransport,
    ) -> ServiceResult<Transport> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        if let Some(plate_no) = &input.plate_no {
            if TransportRepo::exists_by_plate_no(&mut tx, plate_no, Some(id)).await? {
                return Err(duplicate(KIND, "plate_no", plate_no));
            }
        }
        let transport = TransportRepo::update(&mut tx, id, input)
            .await
            .map_err(|e| {
                unique_violation(e, KIND, "plate_no", input.plate_no.as_deref().unwrap_or_default())
            })?
            .ok_or_else(|| not_found(KIND, id))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id, status = %transport.status, "Updated");
        Ok(transport)
    }

    /// Set (`Some`) or clear (`None`) the current driver.
    pub async fn assign_driver(
        pool: &PgPool,
        id: DbId,
        driver_id: Option<DbId>,
    ) -> ServiceResult<Transport> {
        let mut tx = pool.begin().await?;
        TransportRepo::find_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        if let Some(driver_id) = driver_id {
            lock_driver(&mut tx, driver_id).await?;
        }
        let transport = TransportRepo::assign_driver(&mut tx, id, driver_id)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id, driver_id = ?driver_id, "Assigned driver");
        Ok(transport)
    }

    /// Set (`Some`) or clear (`None`) the current equipment.
    ///
    /// The new unit is placed on this transport, leaving its previous
    /// location. The unit it replaces, if it is still placed here, becomes
    /// unplaced.
    ///
    /// Equipment rows are locked before the transport row, the same order
    /// [`EquipmentService::update`](crate::EquipmentService::update) uses.
    /// The replaced unit is read from an unlocked snapshot, so the slot is
    /// checked again once the transport is locked and the attempt starts
    /// over if another assignment changed it in between.
    pub async fn assign_equipment(
        pool: &PgPool,
        id: DbId,
        equipment_id: Option<DbId>,
    ) -> ServiceResult<Transport> {
        for attempt in 1..=ASSIGN_ATTEMPTS {
            let mut tx = pool.begin().await?;
            let previous = TransportRepo::find_by_id(&mut tx, id)
                .await?
                .ok_or_else(|| not_found(KIND, id))?
                .current_equipment_id;

            let mut units: Vec<DbId> = previous.into_iter().chain(equipment_id).collect();
            units.sort_unstable();
            units.dedup();
            let locked = EquipmentRepo::find_many_for_update(&mut tx, &units).await?;
            if let Some(equipment_id) = equipment_id {
                if !locked.iter().any(|unit| unit.id == equipment_id) {
                    return Err(not_found(EntityKind::Equipment, equipment_id));
                }
            }

            let current = TransportRepo::find_for_update(&mut tx, id)
                .await?
                .ok_or_else(|| not_found(KIND, id))?;
            if current.current_equipment_id != previous {
                tracing::debug!(id, attempt, "Equipment slot changed while locking");
                continue;
            }

            if let Some(previous_id) = previous {
                if Some(previous_id) != equipment_id {
                    unload_equipment(&mut tx, id, previous_id).await?;
                }
            }

            let transport = TransportRepo::assign_equipment(&mut tx, id, equipment_id)
                .await?
                .ok_or_else(|| not_found(KIND, id))?;
            if let Some(equipment_id) = equipment_id {
                load_equipment(&mut tx, id, equipment_id).await?;
            }
            tx.commit().await?;

            tracing::info!(
                entity = KIND.label(),
                id,
                equipment_id = ?equipment_id,
                previous = ?previous,
                "Assigned equipment"
            );
            return Ok(transport);
        }
        Err(invalid(format!(
            "equipment of transport {id} kept changing during assignment; try again"
        )))
    }

    /// Active driver, equipment and orders that would block a delete.
    pub async fn check_delete_conflicts(pool: &PgPool, id: DbId) -> ServiceResult<ConflictReport> {
        guard::check_delete_conflicts(pool, KIND, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        guard::delete(pool, KIND, id).await
    }

    pub async fn restore(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        let mut tx = pool.begin().await?;
        let plate_no = match TransportRepo::find_by_id_include_deleted(&mut tx, id).await? {
            Some(transport) => {
                if transport.deleted_at.is_some()
                    && TransportRepo::exists_by_plate_no(&mut tx, &transport.plate_no, Some(id)).await?
                {
                    return Err(duplicate(KIND, "plate_no", &transport.plate_no));
                }
                transport.plate_no
            }
            None => String::new(),
        };
        guard::restore_unique_in(&mut tx, KIND, id, "plate_no", &plate_no).await?;
        tx.commit().await?;
        Ok(())
    }
}

async fn lock_driver(conn: &mut PgConnection, driver_id: DbId) -> ServiceResult<()> {
    DriverRepo::find_for_share(conn, driver_id)
        .await?
        .ok_or_else(|| not_found(EntityKind::Driver, driver_id))?;
    Ok(())
}

/// Place the unit on `transport_id` and drop it from every other
/// transport's current-equipment slot.
async fn load_equipment(
    conn: &mut PgConnection,
    transport_id: DbId,
    equipment_id: DbId,
) -> ServiceResult<()> {
    EquipmentRepo::set_placement(&mut *conn, equipment_id, Some(Placement::Transport(transport_id)))
        .await?
        .ok_or_else(|| not_found(EntityKind::Equipment, equipment_id))?;
    TransportRepo::detach_equipment(&mut *conn, equipment_id, Some(transport_id)).await?;
    Ok(())
}

/// Clear the unit's placement if it is still on `transport_id`. The caller
/// already holds the unit's row lock.
async fn unload_equipment(
    conn: &mut PgConnection,
    transport_id: DbId,
    equipment_id: DbId,
) -> ServiceResult<()> {
    if let Some(unit) = EquipmentRepo::find_for_update(&mut *conn, equipment_id).await? {
        if unit.transport_id == Some(transport_id) {
            EquipmentRepo::set_placement(&mut *conn, equipment_id, None).await?;
        }
    }
    Ok(())
}
