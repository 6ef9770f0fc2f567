//! Uniqueness, placement and payload validation through the service layer.

use assert_matches::assert_matches;
use fleet_core::error::CoreError;
use fleet_core::placement::PlacementSlot;
use fleet_core::transport::TransportStatus;
use fleet_db::models::client::{CreateClient, UpdateClient};
use fleet_db::models::equipment::{CreateEquipment, UpdateEquipment};
use fleet_db::models::transport::{CreateTransport, UpdateTransport};
use fleet_db::models::warehouse::CreateWarehouse;
use fleet_service::{
    ClientService, EquipmentService, ServiceError, TransportService, WarehouseService,
};
use sqlx::PgPool;

fn new_client(name: &str) -> CreateClient {
    CreateClient {
        name: name.to_string(),
        tax_id: None,
        email: None,
        phone: None,
        notes: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_client_name(pool: PgPool) {
    let first = ClientService::create(&pool, &new_client("Acme")).await.unwrap();
    let other = ClientService::create(&pool, &new_client("Globex")).await.unwrap();

    let err = ClientService::create(&pool, &new_client("Acme")).await.unwrap_err();
    assert_matches!(
        err,
        ServiceError::Core(CoreError::DuplicateKey { field: "name", .. })
    );

    let err = ClientService::update(
        &pool,
        other.id,
        &UpdateClient {
            name: Some("Acme".to_string()),
            ..UpdateClient::default()
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::DuplicateKey { .. }));

    // Renaming a client to its own name is not a conflict.
    ClientService::update(
        &pool,
        first.id,
        &UpdateClient {
            name: Some("Acme".to_string()),
            ..UpdateClient::default()
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_blocked_when_name_was_reused(pool: PgPool) {
    let old = ClientService::create(&pool, &new_client("Initech")).await.unwrap();
    ClientService::delete(&pool, old.id).await.unwrap();
    ClientService::create(&pool, &new_client("Initech")).await.unwrap();

    let err = ClientService::restore(&pool, old.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::DuplicateKey { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_email_is_validation_error(pool: PgPool) {
    let err = ClientService::create(
        &pool,
        &CreateClient {
            email: Some("not-an-email".to_string()),
            ..new_client("Bad Mail")
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Validation(_)));
    assert!(err.is_domain());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_two_placements_rejected_before_any_write(pool: PgPool) {
    let warehouse = WarehouseService::create(
        &pool,
        &CreateWarehouse {
            name: "North".to_string(),
            address: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let err = EquipmentService::create(
        &pool,
        &CreateEquipment {
            equipment_type: "bin".to_string(),
            warehouse_id: Some(warehouse.id),
            transport_id: Some(1),
            ..CreateEquipment::default()
        },
    )
    .await
    .unwrap_err();
    let Some(CoreError::InvalidPlacement(violation)) = err.core() else {
        panic!("expected InvalidPlacement, got {err:?}");
    };
    assert_eq!(
        violation.slots,
        vec![PlacementSlot::Transport, PlacementSlot::Warehouse]
    );

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM equipment")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_without_placement_keeps_it(pool: PgPool) {
    let warehouse = WarehouseService::create(
        &pool,
        &CreateWarehouse {
            name: "South".to_string(),
            address: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let unit = EquipmentService::create(
        &pool,
        &CreateEquipment {
            equipment_type: "bin".to_string(),
            warehouse_id: Some(warehouse.id),
            ..CreateEquipment::default()
        },
    )
    .await
    .unwrap();

    let updated = EquipmentService::update(
        &pool,
        unit.id,
        &UpdateEquipment {
            condition: Some("dented".to_string()),
            ..UpdateEquipment::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.warehouse_id, Some(warehouse.id));
    assert_eq!(updated.condition.as_deref(), Some("dented"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_placement_target_must_exist(pool: PgPool) {
    let err = EquipmentService::create(
        &pool,
        &CreateEquipment {
            equipment_type: "bin".to_string(),
            client_object_id: Some(31_337),
            ..CreateEquipment::default()
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        ServiceError::Core(CoreError::NotFound { entity: "ClientObject", id: 31_337 })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transport_status_and_plate(pool: PgPool) {
    let transport = TransportService::create(
        &pool,
        &CreateTransport {
            plate_no: "K777KK".to_string(),
            ..CreateTransport::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(transport.status, TransportStatus::InWork);

    let repaired = TransportService::update(
        &pool,
        transport.id,
        &UpdateTransport {
            status: Some(TransportStatus::Repair),
            ..UpdateTransport::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(repaired.status, TransportStatus::Repair);

    let err = TransportService::create(
        &pool,
        &CreateTransport {
            plate_no: "K777KK".to_string(),
            ..CreateTransport::default()
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        ServiceError::Core(CoreError::DuplicateKey { field: "plate_no", .. })
    );
}
