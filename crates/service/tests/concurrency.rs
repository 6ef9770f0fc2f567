//! Concurrent writers against guarded deletes, equipment relocation and
//! restore. Each race runs over many fresh rows so an unlucky interleaving
//! shows up as a failed round.

use std::time::Duration;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use fleet_core::error::CoreError;
use fleet_db::models::client::CreateClient;
use fleet_db::models::client_object::CreateClientObject;
use fleet_db::models::driver::CreateDriver;
use fleet_db::models::equipment::{CreateEquipment, UpdateEquipment};
use fleet_db::models::order::CreateOrder;
use fleet_db::models::transport::CreateTransport;
use fleet_db::models::warehouse::CreateWarehouse;
use fleet_db::repositories::ClientRepo;
use fleet_service::{
    ClientObjectService, ClientService, DriverService, EquipmentService, OrderService,
    ServiceError, TransportService, WarehouseService,
};
use sqlx::PgPool;

const ROUNDS: usize = 40;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_client(name: &str) -> CreateClient {
    CreateClient {
        name: name.to_string(),
        tax_id: None,
        email: None,
        phone: None,
        notes: None,
    }
}

async fn seed_site(pool: &PgPool, name: &str) -> (i64, i64) {
    let client = ClientService::create(pool, &new_client(name)).await.unwrap();
    let object = ClientObjectService::create(
        pool,
        &CreateClientObject {
            client_id: client.id,
            name: "Depot".to_string(),
            address: "Quay 4".to_string(),
            latitude: None,
            longitude: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    (client.id, object.id)
}

fn new_order(client_id: i64, object_id: i64) -> CreateOrder {
    CreateOrder {
        client_id,
        object_id,
        scheduled_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
        window_start: None,
        window_end: None,
        transport_id: None,
        notes: None,
        created_by: None,
    }
}

fn container() -> CreateEquipment {
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

fn new_driver(license_no: &str) -> CreateDriver {
    CreateDriver {
        full_name: "Pavel Orlov".to_string(),
        phone: None,
        license_no: license_no.to_string(),
        license_class: Some("CE".to_string()),
        photo: None,
    }
}

async fn count(pool: &PgPool, query: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(query)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// One side of a delete-vs-reference race must win; the loser fails with a
/// domain error, never a storage error.
fn assert_one_winner<A: std::fmt::Debug, B: std::fmt::Debug>(
    deleted: &Result<A, ServiceError>,
    written: &Result<B, ServiceError>,
) {
    match (deleted, written) {
        (Ok(_), Err(err)) => assert_matches!(err.core(), Some(CoreError::NotFound { .. })),
        (Err(err), Ok(_)) => assert_matches!(err.core(), Some(CoreError::Conflict(_))),
        other => panic!("expected exactly one winner, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Guarded delete vs reference writers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_object_delete_racing_order_create(pool: PgPool) {
    for round in 0..ROUNDS {
        let (client_id, object_id) = seed_site(&pool, &format!("Race client {round}")).await;

        let order = new_order(client_id, object_id);
        let (deleted, written) = tokio::join!(
            ClientObjectService::delete(&pool, object_id),
            OrderService::create(&pool, &order),
        );
        assert_one_winner(&deleted, &written);
    }

    let dangling = count(
        &pool,
        "SELECT COUNT(*) FROM orders o
         JOIN client_objects c ON c.id = o.object_id
         WHERE o.deleted_at IS NULL
           AND o.status IN ('DRAFT', 'SCHEDULED', 'IN_PROGRESS')
           AND c.deleted_at IS NOT NULL",
    )
    .await;
    assert_eq!(dangling, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transport_delete_racing_equipment_create(pool: PgPool) {
    for round in 0..ROUNDS {
        let transport = TransportService::create(&pool, &new_transport(&format!("RT{round:03}")))
            .await
            .unwrap();
        let placed = CreateEquipment {
            transport_id: Some(transport.id),
            ..container()
        };

        let (deleted, written) = tokio::join!(
            TransportService::delete(&pool, transport.id),
            EquipmentService::create(&pool, &placed),
        );
        assert_one_winner(&deleted, &written);
    }

    let dangling = count(
        &pool,
        "SELECT COUNT(*) FROM equipment e
         JOIN transports t ON t.id = e.transport_id
         WHERE e.deleted_at IS NULL AND t.deleted_at IS NOT NULL",
    )
    .await;
    assert_eq!(dangling, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_driver_delete_racing_transport_create(pool: PgPool) {
    for round in 0..ROUNDS {
        let driver = DriverService::create(&pool, &new_driver(&format!("LIC-{round:04}")))
            .await
            .unwrap();
        let driven = CreateTransport {
            current_driver_id: Some(driver.id),
            ..new_transport(&format!("DR{round:03}"))
        };

        let (deleted, written) = tokio::join!(
            DriverService::delete(&pool, driver.id),
            TransportService::create(&pool, &driven),
        );
        assert_one_winner(&deleted, &written);
    }

    let dangling = count(
        &pool,
        "SELECT COUNT(*) FROM transports t
         JOIN drivers d ON d.id = t.current_driver_id
         WHERE t.deleted_at IS NULL AND d.deleted_at IS NOT NULL",
    )
    .await;
    assert_eq!(dangling, 0);
}

// ---------------------------------------------------------------------------
// Equipment relocation vs transport assignment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_relocation_and_assignment_of_same_pair_both_succeed(pool: PgPool) {
    for round in 0..ROUNDS {
        let transport = TransportService::create(&pool, &new_transport(&format!("PX{round:03}")))
            .await
            .unwrap();
        let unit = EquipmentService::create(&pool, &container()).await.unwrap();
        let relocate = UpdateEquipment {
            transport_id: Some(transport.id),
            ..UpdateEquipment::default()
        };

        let (relocated, assigned) = tokio::join!(
            EquipmentService::update(&pool, unit.id, &relocate),
            TransportService::assign_equipment(&pool, transport.id, Some(unit.id)),
        );
        relocated.unwrap_or_else(|e| panic!("round {round}: relocation failed: {e:?}"));
        assigned.unwrap_or_else(|e| panic!("round {round}: assignment failed: {e:?}"));

        let unit = EquipmentService::get_by_id(&pool, unit.id, false).await.unwrap();
        let transport = TransportService::get_by_id(&pool, transport.id, false)
            .await
            .unwrap();
        assert_eq!(unit.transport_id, Some(transport.id));
        assert_eq!(transport.current_equipment_id, Some(unit.id));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moving_current_unit_away_while_swapping_it_out(pool: PgPool) {
    let warehouse = WarehouseService::create(
        &pool,
        &CreateWarehouse {
            name: "North yard".to_string(),
            address: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    for round in 0..ROUNDS {
        let old = EquipmentService::create(&pool, &container()).await.unwrap();
        let transport = TransportService::create(
            &pool,
            &CreateTransport {
                current_equipment_id: Some(old.id),
                ..new_transport(&format!("SW{round:03}"))
            },
        )
        .await
        .unwrap();
        let replacement = EquipmentService::create(&pool, &container()).await.unwrap();
        let to_warehouse = UpdateEquipment {
            warehouse_id: Some(warehouse.id),
            ..UpdateEquipment::default()
        };

        let (moved, assigned) = tokio::join!(
            EquipmentService::update(&pool, old.id, &to_warehouse),
            TransportService::assign_equipment(&pool, transport.id, Some(replacement.id)),
        );
        moved.unwrap_or_else(|e| panic!("round {round}: move failed: {e:?}"));
        assigned.unwrap_or_else(|e| panic!("round {round}: assignment failed: {e:?}"));

        let old = EquipmentService::get_by_id(&pool, old.id, false).await.unwrap();
        let replacement = EquipmentService::get_by_id(&pool, replacement.id, false)
            .await
            .unwrap();
        let transport = TransportService::get_by_id(&pool, transport.id, false)
            .await
            .unwrap();
        assert_eq!(old.warehouse_id, Some(warehouse.id));
        assert_eq!(old.transport_id, None);
        assert_eq!(replacement.transport_id, Some(transport.id));
        assert_eq!(transport.current_equipment_id, Some(replacement.id));
    }
}

// ---------------------------------------------------------------------------
// Restore vs create of the same unique value
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_racing_create_of_same_name_is_duplicate(pool: PgPool) {
    let old = ClientService::create(&pool, &new_client("Northwind")).await.unwrap();
    ClientService::delete(&pool, old.id).await.unwrap();

    // The new row is invisible to the restore's pre-check until committed,
    // so the restore's own UPDATE runs into the unique index.
    let mut holder = pool.begin().await.unwrap();
    ClientRepo::create(&mut holder, &new_client("Northwind"))
        .await
        .unwrap();
    let release = async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        holder.commit().await.unwrap();
    };

    let (restored, ()) = tokio::join!(ClientService::restore(&pool, old.id), release);

    assert_matches!(
        restored,
        Err(ServiceError::Core(CoreError::DuplicateKey { field: "name", .. }))
    );
    let old = ClientService::get_by_id(&pool, old.id, true).await.unwrap();
    assert!(old.deleted_at.is_some());
}
