//! Driver service.

use fleet_core::conflict::ConflictReport;
use fleet_core::entity::EntityKind;
use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use fleet_db::models::driver::{CreateDriver, Driver, DriverFilter, UpdateDriver};
use fleet_db::repositories::DriverRepo;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{duplicate, not_found, unique_violation, ServiceResult};
use crate::guard;

const KIND: EntityKind = EntityKind::Driver;

pub struct DriverService;

impl DriverService {
    /// Create a driver. License numbers are unique among live drivers.
    pub async fn create(pool: &PgPool, input: &CreateDriver) -> ServiceResult<Driver> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        if DriverRepo::exists_by_license_no(&mut tx, &input.license_no, None).await? {
            return Err(duplicate(KIND, "license_no", &input.license_no));
        }
        let driver = DriverRepo::create(&mut tx, input)
            .await
            .map_err(|e| unique_violation(e, KIND, "license_no", &input.license_no))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id = driver.id, "Created");
        Ok(driver)
    }

    pub async fn get_by_id(pool: &PgPool, id: DbId, include_deleted: bool) -> ServiceResult<Driver> {
        let mut conn = pool.acquire().await?;
        let found = if include_deleted {
            DriverRepo::find_by_id_include_deleted(&mut conn, id).await?
        } else {
            DriverRepo::find_by_id(&mut conn, id).await?
        };
        found.ok_or_else(|| not_found(KIND, id))
    }

    pub async fn list(
        pool: &PgPool,
        filter: &DriverFilter,
        page: &PageRequest,
    ) -> ServiceResult<Page<Driver>> {
        let mut conn = pool.acquire().await?;
        Ok(DriverRepo::list(&mut conn, filter, page).await?)
    }

    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateDriver) -> ServiceResult<Driver> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        if let Some(license_no) = &input.license_no {
            if DriverRepo::exists_by_license_no(&mut tx, license_no, Some(id)).await? {
                return Err(duplicate(KIND, "license_no", license_no));
            }
        }
        let driver = DriverRepo::update(&mut tx, id, input)
            .await
            .map_err(|e| {
                unique_violation(e, KIND, "license_no", input.license_no.as_deref().unwrap_or_default())
            })?
            .ok_or_else(|| not_found(KIND, id))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id, "Updated");
        Ok(driver)
    }

    pub async fn check_delete_conflicts(pool: &PgPool, id: DbId) -> ServiceResult<ConflictReport> {
        guard::check_delete_conflicts(pool, KIND, id).await
    }

    /// Guarded delete: blocked while the driver is the current driver of a
    /// live transport.
    pub async fn delete(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        guard::delete(pool, KIND, id).await
    }

    pub async fn restore(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        let mut tx = pool.begin().await?;
        let license_no = match DriverRepo::find_by_id_include_deleted(&mut tx, id).await? {
            Some(driver) => {
                if driver.deleted_at.is_some()
                    && DriverRepo::exists_by_license_no(&mut tx, &driver.license_no, Some(id)).await?
                {
                    return Err(duplicate(KIND, "license_no", &driver.license_no));
                }
                driver.license_no
            }
            None => String::new(),
        };
        guard::restore_unique_in(&mut tx, KIND, id, "license_no", &license_no).await?;
        tx.commit().await?;
        Ok(())
    }
}
