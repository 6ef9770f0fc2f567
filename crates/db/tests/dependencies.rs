//! Integration tests for the active-dependent queries behind guarded deletes.

use chrono::NaiveDate;
use fleet_core::conflict::Dependent;
use fleet_core::entity::EntityKind;
use fleet_core::lifecycle::RowState;
use fleet_core::order::OrderStatus;
use fleet_core::placement::Placement;
use fleet_db::models::client::CreateClient;
use fleet_db::models::client_object::CreateClientObject;
use fleet_db::models::driver::CreateDriver;
use fleet_db::models::equipment::CreateEquipment;
use fleet_db::models::order::CreateOrder;
use fleet_db::models::transport::CreateTransport;
use fleet_db::models::warehouse::CreateWarehouse;
use fleet_db::repositories::{
    ClientObjectRepo, ClientRepo, DependencyRepo, DriverRepo, EquipmentRepo, OrderRepo,
    TransportRepo, WarehouseRepo,
};
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_object(conn: &mut PoolConnection<Postgres>) -> (i64, i64) {
    let client = ClientRepo::create(
        conn,
        &CreateClient {
            name: "Dependents Ltd".to_string(),
            tax_id: None,
            email: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let object = ClientObjectRepo::create(
        conn,
        &CreateClientObject {
            client_id: client.id,
            name: "Yard".to_string(),
            address: "Main st 5".to_string(),
            latitude: None,
            longitude: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    (client.id, object.id)
}

fn new_order(client_id: i64, object_id: i64, transport_id: Option<i64>) -> CreateOrder {
    CreateOrder {
        client_id,
        object_id,
        scheduled_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        window_start: None,
        window_end: None,
        transport_id,
        notes: None,
        created_by: None,
    }
}

fn new_equipment() -> CreateEquipment {
    CreateEquipment {
        equipment_type: "container".to_string(),
        volume: Some(8.0),
        ..CreateEquipment::default()
    }
}

fn new_transport(plate_no: &str) -> CreateTransport {
    CreateTransport {
        plate_no: plate_no.to_string(),
        ..CreateTransport::default()
    }
}

// ---------------------------------------------------------------------------
// Client object
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_active_orders_block_client_object(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (client_id, object_id) = seed_object(&mut conn).await;

    let draft = OrderRepo::create(&mut conn, &new_order(client_id, object_id, None))
        .await
        .unwrap();
    let done = OrderRepo::create(&mut conn, &new_order(client_id, object_id, None))
        .await
        .unwrap();
    OrderRepo::update_status(&mut conn, done.id, OrderStatus::Completed)
        .await
        .unwrap();
    let deleted = OrderRepo::create(&mut conn, &new_order(client_id, object_id, None))
        .await
        .unwrap();
    OrderRepo::soft_delete(&mut conn, deleted.id).await.unwrap();

    let ids = DependencyRepo::active_dependents(
        &mut conn,
        EntityKind::ClientObject,
        object_id,
        Dependent::Orders,
    )
    .await
    .unwrap();
    assert_eq!(ids, vec![draft.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_equipment_at_client_object(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, object_id) = seed_object(&mut conn).await;

    let placed = EquipmentRepo::create(
        &mut conn,
        &new_equipment(),
        Some(Placement::ClientObject(object_id)),
    )
    .await
    .unwrap();
    EquipmentRepo::create(&mut conn, &new_equipment(), None)
        .await
        .unwrap();

    let ids = DependencyRepo::equipment_at_client_object(&mut conn, object_id)
        .await
        .unwrap();
    assert_eq!(ids, vec![placed.id]);

    EquipmentRepo::set_placement(&mut conn, placed.id, None)
        .await
        .unwrap();
    let ids = DependencyRepo::equipment_at_client_object(&mut conn, object_id)
        .await
        .unwrap();
    assert!(ids.is_empty());
}

// ---------------------------------------------------------------------------
// Warehouse, driver
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_deleted_equipment_does_not_block_warehouse(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let warehouse = WarehouseRepo::create(
        &mut conn,
        &CreateWarehouse {
            name: "Central".to_string(),
            address: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let unit = EquipmentRepo::create(
        &mut conn,
        &new_equipment(),
        Some(Placement::Warehouse(warehouse.id)),
    )
    .await
    .unwrap();

    let before = DependencyRepo::equipment_at_warehouse(&mut conn, warehouse.id)
        .await
        .unwrap();
    assert_eq!(before, vec![unit.id]);

    EquipmentRepo::soft_delete(&mut conn, unit.id).await.unwrap();
    let after = DependencyRepo::equipment_at_warehouse(&mut conn, warehouse.id)
        .await
        .unwrap();
    assert!(after.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_driver_and_transport_reference_each_other(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let driver = DriverRepo::create(
        &mut conn,
        &CreateDriver {
            full_name: "Anna Sidorova".to_string(),
            phone: None,
            license_no: "DL-77".to_string(),
            license_class: None,
            photo: None,
        },
    )
    .await
    .unwrap();
    let transport = TransportRepo::create(&mut conn, &new_transport("A123BC"))
        .await
        .unwrap();
    TransportRepo::assign_driver(&mut conn, transport.id, Some(driver.id))
        .await
        .unwrap();

    let transports = DependencyRepo::transports_driven_by(&mut conn, driver.id)
        .await
        .unwrap();
    assert_eq!(transports, vec![transport.id]);

    let drivers = DependencyRepo::driver_of_transport(&mut conn, transport.id)
        .await
        .unwrap();
    assert_eq!(drivers, vec![driver.id]);

    DriverRepo::soft_delete(&mut conn, driver.id).await.unwrap();
    let drivers = DependencyRepo::driver_of_transport(&mut conn, transport.id)
        .await
        .unwrap();
    assert!(drivers.is_empty(), "soft-deleted driver is not active");
}

// ---------------------------------------------------------------------------
// Transport, equipment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_equipment_attachment_is_seen_from_both_sides(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let transport = TransportRepo::create(&mut conn, &new_transport("B456CD"))
        .await
        .unwrap();
    let current = EquipmentRepo::create(&mut conn, &new_equipment(), None)
        .await
        .unwrap();
    let loaded = EquipmentRepo::create(
        &mut conn,
        &new_equipment(),
        Some(Placement::Transport(transport.id)),
    )
    .await
    .unwrap();
    TransportRepo::assign_equipment(&mut conn, transport.id, Some(current.id))
        .await
        .unwrap();

    let on_transport = DependencyRepo::equipment_on_transport(&mut conn, transport.id)
        .await
        .unwrap();
    assert_eq!(on_transport, vec![current.id, loaded.id]);

    let carrying = DependencyRepo::transports_carrying(&mut conn, current.id)
        .await
        .unwrap();
    assert_eq!(carrying, vec![transport.id]);
    let carrying = DependencyRepo::transports_carrying(&mut conn, loaded.id)
        .await
        .unwrap();
    assert_eq!(carrying, vec![transport.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transport_orders_and_unguarded_pairs(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (client_id, object_id) = seed_object(&mut conn).await;
    let transport = TransportRepo::create(&mut conn, &new_transport("C789EF"))
        .await
        .unwrap();
    let order = OrderRepo::create(&mut conn, &new_order(client_id, object_id, Some(transport.id)))
        .await
        .unwrap();
    OrderRepo::update_status(&mut conn, order.id, OrderStatus::Scheduled)
        .await
        .unwrap();

    let ids = DependencyRepo::active_dependents(
        &mut conn,
        EntityKind::Transport,
        transport.id,
        Dependent::Orders,
    )
    .await
    .unwrap();
    assert_eq!(ids, vec![order.id]);

    let ids = DependencyRepo::active_dependents(
        &mut conn,
        EntityKind::Client,
        client_id,
        Dependent::Orders,
    )
    .await
    .unwrap();
    assert!(ids.is_empty(), "clients are not guarded");
}

// ---------------------------------------------------------------------------
// Row state
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_row_state_tracks_soft_delete(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (client_id, _) = seed_object(&mut conn).await;

    let state = DependencyRepo::row_state(&mut conn, EntityKind::Client, client_id)
        .await
        .unwrap();
    assert_eq!(state, Some(RowState::Live));

    ClientRepo::soft_delete(&mut conn, client_id).await.unwrap();
    let state = DependencyRepo::lock_row(&mut conn, EntityKind::Client, client_id)
        .await
        .unwrap();
    assert_eq!(state, Some(RowState::Deleted));

    let state = DependencyRepo::row_state(&mut conn, EntityKind::Client, 999_999)
        .await
        .unwrap();
    assert_eq!(state, None);
}
