//! Client service.

use fleet_core::conflict::ConflictReport;
use fleet_core::entity::EntityKind;
use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use fleet_db::models::client::{Client, ClientFilter, CreateClient, UpdateClient};
use fleet_db::repositories::ClientRepo;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{duplicate, not_found, unique_violation, ServiceResult};
use crate::guard;

const KIND: EntityKind = EntityKind::Client;

pub struct ClientService;

impl ClientService {
    /// Create a client. Fails with `DuplicateKey` if a live client has the name.
    pub async fn create(pool: &PgPool, input: &CreateClient) -> ServiceResult<Client> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        if ClientRepo::exists_by_name(&mut tx, &input.name, None).await? {
            return Err(duplicate(KIND, "name", &input.name));
        }
        let client = ClientRepo::create(&mut tx, input)
            .await
            .map_err(|e| unique_violation(e, KIND, "name", &input.name))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id = client.id, "Created");
        Ok(client)
    }

    pub async fn get_by_id(pool: &PgPool, id: DbId, include_deleted: bool) -> ServiceResult<Client> {
        let mut conn = pool.acquire().await?;
        let found = if include_deleted {
            ClientRepo::find_by_id_include_deleted(&mut conn, id).await?
        } else {
            ClientRepo::find_by_id(&mut conn, id).await?
        };
        found.ok_or_else(|| not_found(KIND, id))
    }

    pub async fn list(
        pool: &PgPool,
        filter: &ClientFilter,
        page: &PageRequest,
    ) -> ServiceResult<Page<Client>> {
        let mut conn = pool.acquire().await?;
        Ok(ClientRepo::list(&mut conn, filter, page).await?)
    }

    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateClient) -> ServiceResult<Client> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        if let Some(name) = &input.name {
            if ClientRepo::exists_by_name(&mut tx, name, Some(id)).await? {
                return Err(duplicate(KIND, "name", name));
            }
        }
        let client = ClientRepo::update(&mut tx, id, input)
            .await
            .map_err(|e| unique_violation(e, KIND, "name", input.name.as_deref().unwrap_or_default()))?
            .ok_or_else(|| not_found(KIND, id))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id, "Updated");
        Ok(client)
    }

    /// Clients have no guarded dependents, so this always yields an empty
    /// report for a live client.
    pub async fn check_delete_conflicts(pool: &PgPool, id: DbId) -> ServiceResult<ConflictReport> {
        guard::check_delete_conflicts(pool, KIND, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        guard::delete(pool, KIND, id).await
    }

    /// Restore a client. Fails with `DuplicateKey` if another live client has
    /// taken its name in the meantime.
    pub async fn restore(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        let mut tx = pool.begin().await?;
        let name = match ClientRepo::find_by_id_include_deleted(&mut tx, id).await? {
            Some(client) => {
                if client.deleted_at.is_some()
                    && ClientRepo::exists_by_name(&mut tx, &client.name, Some(id)).await?
                {
                    return Err(duplicate(KIND, "name", &client.name));
                }
                client.name
            }
            None => String::new(),
        };
        guard::restore_unique_in(&mut tx, KIND, id, "name", &name).await?;
        tx.commit().await?;
        Ok(())
    }
}
