//! Warehouse service.

use fleet_core::conflict::ConflictReport;
use fleet_core::entity::EntityKind;
use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use fleet_db::models::warehouse::{CreateWarehouse, UpdateWarehouse, Warehouse, WarehouseFilter};
use fleet_db::repositories::WarehouseRepo;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{duplicate, not_found, unique_violation, ServiceResult};
use crate::guard;

const KIND: EntityKind = EntityKind::Warehouse;

pub struct WarehouseService;

impl WarehouseService {
    pub async fn create(pool: &PgPool, input: &CreateWarehouse) -> ServiceResult<Warehouse> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        if WarehouseRepo::exists_by_name(&mut tx, &input.name, None).await? {
            return Err(duplicate(KIND, "name", &input.name));
        }
        let warehouse = WarehouseRepo::create(&mut tx, input)
            .await
            .map_err(|e| unique_violation(e, KIND, "name", &input.name))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id = warehouse.id, "Created");
        Ok(warehouse)
    }

    pub async fn get_by_id(
        pool: &PgPool,
        id: DbId,
        include_deleted: bool,
    ) -> ServiceResult<Warehouse> {
        let mut conn = pool.acquire().await?;
        let found = if include_deleted {
            WarehouseRepo::find_by_id_include_deleted(&mut conn, id).await?
        } else {
            WarehouseRepo::find_by_id(&mut conn, id).await?
        };
        found.ok_or_else(|| not_found(KIND, id))
    }

    pub async fn list(
        pool: &PgPool,
        filter: &WarehouseFilter,
        page: &PageRequest,
    ) -> ServiceResult<Page<Warehouse>> {
        let mut conn = pool.acquire().await?;
        Ok(WarehouseRepo::list(&mut conn, filter, page).await?)
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWarehouse,
    ) -> ServiceResult<Warehouse> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        if let Some(name) = &input.name {
            if WarehouseRepo::exists_by_name(&mut tx, name, Some(id)).await? {
                return Err(duplicate(KIND, "name", name));
            }
        }
        let warehouse = WarehouseRepo::update(&mut tx, id, input)
            .await
            .map_err(|e| unique_violation(e, KIND, "name", input.name.as_deref().unwrap_or_default()))?
            .ok_or_else(|| not_found(KIND, id))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id, "Updated");
        Ok(warehouse)
    }

    pub async fn check_delete_conflicts(pool: &PgPool, id: DbId) -> ServiceResult<ConflictReport> {
        guard::check_delete_conflicts(pool, KIND, id).await
    }

    /// Guarded delete: blocked while live equipment is stored here.
    pub async fn delete(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        guard::delete(pool, KIND, id).await
    }

    pub async fn restore(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        let mut tx = pool.begin().await?;
        let name = match WarehouseRepo::find_by_id_include_deleted(&mut tx, id).await? {
            Some(warehouse) => {
                if warehouse.deleted_at.is_some()
                    && WarehouseRepo::exists_by_name(&mut tx, &warehouse.name, Some(id)).await?
                {
                    return Err(duplicate(KIND, "name", &warehouse.name));
                }
                warehouse.name
            }
            None => String::new(),
        };
        guard::restore_unique_in(&mut tx, KIND, id, "name", &name).await?;
        tx.commit().await?;
        Ok(())
    }
}
