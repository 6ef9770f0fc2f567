//! Client object (service site) service.

use fleet_core::conflict::ConflictReport;
use fleet_core::entity::EntityKind;
use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use fleet_db::models::client_object::{
    ClientObject, ClientObjectFilter, CreateClientObject, UpdateClientObject,
};
use fleet_db::repositories::{ClientObjectRepo, ClientRepo};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{not_found, ServiceResult};
use crate::guard;

const KIND: EntityKind = EntityKind::ClientObject;

pub struct ClientObjectService;

impl ClientObjectService {
    /// Create a site for an existing, live client.
    pub async fn create(pool: &PgPool, input: &CreateClientObject) -> ServiceResult<ClientObject> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        ClientRepo::find_for_share(&mut tx, input.client_id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Client, input.client_id))?;
        let object = ClientObjectRepo::create(&mut tx, input).await?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id = object.id, client_id = object.client_id, "Created");
        Ok(object)
    }

    pub async fn get_by_id(
        pool: &PgPool,
        id: DbId,
        include_deleted: bool,
    ) -> ServiceResult<ClientObject> {
        let mut conn = pool.acquire().await?;
        let found = if include_deleted {
            ClientObjectRepo::find_by_id_include_deleted(&mut conn, id).await?
        } else {
            ClientObjectRepo::find_by_id(&mut conn, id).await?
        };
        found.ok_or_else(|| not_found(KIND, id))
    }

    pub async fn list(
        pool: &PgPool,
        filter: &ClientObjectFilter,
        page: &PageRequest,
    ) -> ServiceResult<Page<ClientObject>> {
        let mut conn = pool.acquire().await?;
        Ok(ClientObjectRepo::list(&mut conn, filter, page).await?)
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateClientObject,
    ) -> ServiceResult<ClientObject> {
        input.validate()?;
        let mut tx = pool.begin().await?;
        if let Some(client_id) = input.client_id {
            ClientRepo::find_for_share(&mut tx, client_id)
                .await?
                .ok_or_else(|| not_found(EntityKind::Client, client_id))?;
        }
        let object = ClientObjectRepo::update(&mut tx, id, input)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id, "Updated");
        Ok(object)
    }

    /// Active orders and placed equipment that would block a delete.
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
