//! Postgres binding of the core [`LifecycleStore`] seam.

use async_trait::async_trait;
use fleet_core::conflict::Dependent;
use fleet_core::entity::EntityKind;
use fleet_core::lifecycle::{LifecycleStore, RowState};
use fleet_core::types::DbId;
use sqlx::PgConnection;

use crate::repositories::{
    ClientObjectRepo, ClientRepo, DependencyRepo, DriverRepo, EquipmentRepo, OrderRepo,
    TransportRepo, WarehouseRepo,
};

/// Lifecycle store over a borrowed connection, normally `&mut *tx`.
///
/// Row locks taken through this store live as long as the caller's
/// transaction.
pub struct PgLifecycleStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgLifecycleStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c> LifecycleStore for PgLifecycleStore<'c> {
    type Error = sqlx::Error;

    async fn row_state(
        &mut self,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RowState>, sqlx::Error> {
        DependencyRepo::row_state(&mut *self.conn, kind, id).await
    }

    async fn lock_row(
        &mut self,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RowState>, sqlx::Error> {
        DependencyRepo::lock_row(&mut *self.conn, kind, id).await
    }

    async fn active_dependents(
        &mut self,
        kind: EntityKind,
        id: DbId,
        dependent: Dependent,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        DependencyRepo::active_dependents(&mut *self.conn, kind, id, dependent).await
    }

    async fn soft_delete(&mut self, kind: EntityKind, id: DbId) -> Result<bool, sqlx::Error> {
        let conn = &mut *self.conn;
        match kind {
            EntityKind::Client => ClientRepo::soft_delete(conn, id).await,
            EntityKind::ClientObject => ClientObjectRepo::soft_delete(conn, id).await,
            EntityKind::Equipment => EquipmentRepo::soft_delete(conn, id).await,
            EntityKind::Transport => TransportRepo::soft_delete(conn, id).await,
            EntityKind::Driver => DriverRepo::soft_delete(conn, id).await,
            EntityKind::Warehouse => WarehouseRepo::soft_delete(conn, id).await,
            EntityKind::Order => OrderRepo::soft_delete(conn, id).await,
        }
    }

    async fn restore(&mut self, kind: EntityKind, id: DbId) -> Result<bool, sqlx::Error> {
        let conn = &mut *self.conn;
        match kind {
            EntityKind::Client => ClientRepo::restore(conn, id).await,
            EntityKind::ClientObject => ClientObjectRepo::restore(conn, id).await,
            EntityKind::Equipment => EquipmentRepo::restore(conn, id).await,
            EntityKind::Transport => TransportRepo::restore(conn, id).await,
            EntityKind::Driver => DriverRepo::restore(conn, id).await,
            EntityKind::Warehouse => WarehouseRepo::restore(conn, id).await,
            EntityKind::Order => OrderRepo::restore(conn, id).await,
        }
    }
}
