// Integration tests for the inventory services
// Every test runs against its own migrated in-memory SQLite database

use std::collections::HashMap;

use supermanager_auth::service::user::{self, UserForm};
use supermanager_common::{NON_FIELD_ERRORS, SuperManagerError};
use supermanager_inventory::model::*;
use supermanager_inventory::service::catalog::{device_disks, device_types};
use supermanager_inventory::service::{
    catalog, device, device_software, location, location_zone, notification, notification_type,
    settings::{self, SettingsService}, software,
};
use supermanager_migration::{Migrator, MigratorTrait};
use supermanager_persistence::PageRequest;
use supermanager_persistence::entity::{device_types as device_types_entity, users};
use supermanager_persistence::sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, IntoActiveModel, Set,
};

async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn create_user(db: &DatabaseConnection, username: &str, superuser: bool) -> users::Model {
    let form = UserForm {
        username: Some(username.to_string()),
        email: Some(format!("{}@example.com", username)),
        is_superuser: Some(superuser),
        is_staff: Some(superuser),
        ..Default::default()
    };

    user::create(db, &form).await.unwrap().0
}

fn catalog_form(title: &str) -> CatalogForm {
    CatalogForm {
        base: BaseForm {
            title: Some(title.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn validation_errors(err: anyhow::Error) -> supermanager_common::FieldErrors {
    match err.downcast::<SuperManagerError>() {
        Ok(SuperManagerError::Validation(errors)) => errors,
        other => panic!("expected validation error, got {:?}", other),
    }
}

async fn mark_core(db: &DatabaseConnection, id: i32) {
    let model = device_types::find(db, id).await.unwrap();
    let mut active: device_types_entity::ActiveModel = model.into_active_model();
    active.is_core = Set(true);
    active.update(db).await.unwrap();
}

#[tokio::test]
async fn test_catalog_create_sets_audit_fields() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", false).await;

    let form: CatalogForm = serde_json::from_value(serde_json::json!({
        "title": "Laptop",
        "code_name": "laptop",
        "status": 7,
        "is_core": true
    }))
    .unwrap();
    let item = device_types::create(&db, &alice, &form).await.unwrap();

    assert_eq!(item.title, "Laptop");
    assert_eq!(item.status, 1);
    assert!(!item.is_core);
    assert!(!item.is_deprecated);
    assert_eq!(item.creator.as_ref().map(|u| u.username.as_str()), Some("alice"));
    assert!(item.updater.is_none());
    assert!(item.updated_at.is_none());

    let errors = validation_errors(
        device_types::create(&db, &alice, &CatalogForm::default())
            .await
            .unwrap_err(),
    );
    assert!(errors.contains("title"));
}

#[tokio::test]
async fn test_catalog_list_filters_and_ordering() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", false).await;

    for title in ["Desktop", "Laptop", "Tablet"] {
        device_types::create(&db, &alice, &catalog_form(title)).await.unwrap();
    }
    let mut deprecated = catalog_form("Netbook");
    deprecated.is_deprecated = Some(true);
    device_types::create(&db, &alice, &deprecated).await.unwrap();

    let page = device_types::list(&db, &params(&[]), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 4);
    assert_eq!(page.results[0].title, "Desktop");

    let page = device_types::list(&db, &params(&[("ordering", "-title")]), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.results[0].title, "Tablet");

    let page = device_types::list(&db, &params(&[("is_deprecated", "true")]), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].title, "Netbook");

    let page = device_types::list(&db, &params(&[("title", "Laptop")]), PageRequest::new(1, 0))
        .await
        .unwrap();
    assert_eq!(page.count, 1);

    let page = device_types::list(&db, &params(&[]), PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.next_offset(), None);
    assert_eq!(page.previous_offset(), Some(0));

    let err = device_types::list(&db, &params(&[("id", "abc")]), PageRequest::default())
        .await
        .unwrap_err();
    assert!(validation_errors(err).contains("id"));
}

#[tokio::test]
async fn test_catalog_update_and_core_guard() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", false).await;
    let root = create_user(&db, "rootuser", true).await;

    let item = device_types::create(&db, &alice, &catalog_form("Laptop")).await.unwrap();

    let patch: CatalogForm =
        serde_json::from_value(serde_json::json!({"description": "Portable"})).unwrap();
    let updated = device_types::update(&db, &alice, item.id, &patch, true).await.unwrap();
    assert_eq!(updated.title, "Laptop");
    assert_eq!(updated.description.as_deref(), Some("Portable"));
    assert_eq!(updated.updater.as_ref().map(|u| u.id), Some(alice.id));
    assert!(updated.updated_at.is_some());

    // a full update requires the title
    let errors = validation_errors(
        device_types::update(&db, &alice, item.id, &patch, false)
            .await
            .unwrap_err(),
    );
    assert!(errors.contains("title"));

    mark_core(&db, item.id).await;

    let err = device_types::update(&db, &alice, item.id, &patch, true)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Only superadmins can edit core device types.");

    let err = device_types::delete(&db, &alice, item.id).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SuperManagerError>(),
        Some(SuperManagerError::CoreRecordProtected(_))
    ));

    device_types::update(&db, &root, item.id, &catalog_form("Notebook"), false)
        .await
        .unwrap();
    device_types::delete(&db, &root, item.id).await.unwrap();

    let err = device_types::get(&db, item.id).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SuperManagerError>(),
        Some(SuperManagerError::NotFound)
    ));
}

#[tokio::test]
async fn test_software_version() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", false).await;

    let form: SoftwareForm = serde_json::from_value(serde_json::json!({
        "title": "Office",
        "version": "2024"
    }))
    .unwrap();
    let item = software::create(&db, &alice, &form).await.unwrap();
    assert_eq!(item.version.as_deref(), Some("2024"));

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["title"], "Office");
    assert_eq!(json["version"], "2024");

    let form: SoftwareForm =
        serde_json::from_value(serde_json::json!({"version": "v".repeat(101)})).unwrap();
    let errors = validation_errors(software::update(&db, &alice, item.catalog.id, &form, true).await.unwrap_err());
    assert!(errors.contains("version"));
}

async fn seed_location(db: &DatabaseConnection, actor: &users::Model) -> (LocationZoneItem, LocationItem) {
    let zone: LocationZoneForm = serde_json::from_value(serde_json::json!({
        "title": "North",
        "manager": "Jane"
    }))
    .unwrap();
    let zone = location_zone::create(db, actor, &zone).await.unwrap();

    let form: LocationForm = serde_json::from_value(serde_json::json!({
        "title": "HQ",
        "location_zone_id": zone.id,
        "city": "Quito",
        "latitude": -0.18
    }))
    .unwrap();
    let location = location::create(db, actor, &form).await.unwrap();

    (zone, location)
}

#[tokio::test]
async fn test_locations_and_zones() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", false).await;

    let (zone, location) = seed_location(&db, &alice).await;
    assert_eq!(zone.manager, "Jane");
    assert_eq!(zone.manager_email, "");
    assert_eq!(location.location_zone.as_ref().map(|z| z.title.as_str()), Some("North"));
    assert_eq!(location.city, "Quito");
    assert_eq!(location.phone, "");
    assert_eq!(location.devices_count, 0);

    let zone = location_zone::get(&db, zone.id).await.unwrap();
    assert_eq!(zone.locations, vec!["HQ".to_string()]);
    assert_eq!(zone.locations_count, 1);

    let page = location_zone::locations(&db, zone.id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].id, location.id);

    let bad: LocationForm = serde_json::from_value(serde_json::json!({
        "title": "Branch",
        "location_zone_id": 999
    }))
    .unwrap();
    let errors = validation_errors(location::create(&db, &alice, &bad).await.unwrap_err());
    assert_eq!(
        errors.get("location_zone_id").unwrap()[0],
        "Invalid pk \"999\" - object does not exist."
    );

    let page = location::list(&db, &params(&[("location_zone", &zone.id.to_string())]), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
}

async fn seed_device(db: &DatabaseConnection, actor: &users::Model) -> DeviceItem {
    let (_, location) = seed_location(db, actor).await;

    let mut ids = HashMap::new();
    ids.insert("type_id", device_types::create(db, actor, &catalog_form("Laptop")).await.unwrap().id);
    ids.insert(
        "mark_id",
        catalog::device_marks::create(db, actor, &catalog_form("Acme")).await.unwrap().id,
    );
    ids.insert(
        "model_id",
        catalog::device_models::create(db, actor, &catalog_form("X1")).await.unwrap().id,
    );
    ids.insert(
        "system_id",
        catalog::device_systems::create(db, actor, &catalog_form("Linux")).await.unwrap().id,
    );
    ids.insert(
        "build_id",
        catalog::device_builds::create(db, actor, &catalog_form("6.1")).await.unwrap().id,
    );
    ids.insert(
        "processor_id",
        catalog::device_processors::create(db, actor, &catalog_form("i7")).await.unwrap().id,
    );
    ids.insert(
        "ram_id",
        catalog::device_rams::create(db, actor, &catalog_form("16GB")).await.unwrap().id,
    );
    ids.insert("disk_id", device_disks::create(db, actor, &catalog_form("512GB")).await.unwrap().id);

    let mut payload = serde_json::json!({
        "internal_id": "DEV-001",
        "hostname": "dev-001",
        "location_id": location.id
    });
    for (key, id) in &ids {
        payload[*key] = serde_json::json!(id);
    }
    let form: DeviceForm = serde_json::from_value(payload).unwrap();

    device::create(db, actor, &form).await.unwrap()
}

#[tokio::test]
async fn test_device_embeds_references() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", false).await;

    let item = seed_device(&db, &alice).await;
    assert_eq!(item.internal_id, "DEV-001");
    assert_eq!(item.device_type.as_ref().map(|b| b.title.as_str()), Some("Laptop"));
    assert_eq!(item.disk.as_ref().map(|b| b.title.as_str()), Some("512GB"));
    assert_eq!(item.location.as_ref().map(|b| b.title.as_str()), Some("HQ"));

    let location = location::get(&db, item.location.as_ref().unwrap().id).await.unwrap();
    assert_eq!(location.devices_count, 1);

    let page = device::list(&db, &params(&[("hostname", "dev-001")]), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);

    let patch: DeviceForm = serde_json::from_value(serde_json::json!({"ram_id": 999})).unwrap();
    let errors = validation_errors(device::update(&db, &alice, item.id, &patch, true).await.unwrap_err());
    assert!(errors.contains("ram_id"));

    let errors = validation_errors(
        device::create(&db, &alice, &DeviceForm::default())
            .await
            .unwrap_err(),
    );
    assert!(errors.contains("internal_id"));
    assert!(errors.contains("location_id"));

    device::delete(&db, item.id).await.unwrap();
    assert!(device::delete(&db, item.id).await.is_err());
}

#[tokio::test]
async fn test_device_software_uniqueness() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", false).await;
    let device = seed_device(&db, &alice).await;

    let office: SoftwareForm = serde_json::from_value(serde_json::json!({"title": "Office"})).unwrap();
    let office = software::create(&db, &alice, &office).await.unwrap();
    let browser: SoftwareForm = serde_json::from_value(serde_json::json!({"title": "Browser"})).unwrap();
    let browser = software::create(&db, &alice, &browser).await.unwrap();

    let form = DeviceSoftwareForm {
        device_id: Some(device.id),
        software_id: Some(office.catalog.id),
        ..Default::default()
    };
    let link = device_software::create(&db, &form).await.unwrap();
    assert_eq!(link.device, device.id);

    let errors = validation_errors(device_software::create(&db, &form).await.unwrap_err());
    assert_eq!(
        errors.get(NON_FIELD_ERRORS).unwrap()[0],
        device_software::NOT_UNIQUE
    );

    let err = device_software::create(
        &db,
        &DeviceSoftwareForm {
            device_id: Some(device.id),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), device_software::IDS_REQUIRED);

    let err = device_software::create(
        &db,
        &DeviceSoftwareForm {
            device_id: Some(999),
            software_id: Some(office.catalog.id),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), device_software::DEVICE_NOT_FOUND);

    let moved = device_software::update(
        &db,
        link.id,
        &DeviceSoftwareForm {
            software_id: Some(browser.catalog.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.software, browser.catalog.id);

    let page = device_software::list(
        &db,
        &params(&[("device", &device.id.to_string())]),
        PageRequest::default(),
    )
    .await
    .unwrap();
    assert_eq!(page.count, 1);
}

#[tokio::test]
async fn test_notifications_render_type_title() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", false).await;

    let kind = notification_type::create(
        &db,
        &alice,
        &BaseForm {
            title: Some("Warning".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let form: NotificationForm = serde_json::from_value(serde_json::json!({
        "title": "Disk almost full",
        "type_id": kind.id,
        "module": "devices",
        "module_id": 3
    }))
    .unwrap();
    let item = notification::create(&db, &alice, &form).await.unwrap();
    assert_eq!(item.notification_type, "Warning");

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["type"], "Warning");

    let page = notification::list(&db, &params(&[("module", "devices")]), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);

    let errors = validation_errors(
        notification::create(&db, &alice, &NotificationForm::default())
            .await
            .unwrap_err(),
    );
    for field in ["title", "type_id", "module", "module_id"] {
        assert!(errors.contains(field), "missing error for {}", field);
    }
}

#[tokio::test]
async fn test_settings_defaults_are_created_once() {
    let db = setup_db().await;
    let service = SettingsService::default();

    let app = service.app_settings(&db).await.unwrap();
    assert_eq!(app.number_of_alerts, 5);
    assert_eq!(app.default_ordering_column, "created_at");

    let json = serde_json::to_value(&app).unwrap();
    assert!(json.get("id").is_none());
    assert_eq!(json["default_page_size"], 20);

    let user_settings = service.user_settings(&db).await.unwrap();
    assert_eq!(user_settings.default_language, "en");
    assert!(user_settings.time_24h);

    // served from the cache, and a fresh load finds the stored row
    service.app_settings(&db).await.unwrap();
    service.invalidate();
    let again = service.app_settings(&db).await.unwrap();
    assert_eq!(again, app);
}

#[tokio::test]
async fn test_settings_first_reads_may_race() {
    let db = setup_db().await;

    // The loser of the race finds the row already inserted
    let first = settings::create_default_app_settings(&db).await.unwrap();
    let second = settings::create_default_app_settings(&db).await.unwrap();
    assert_eq!(first, second);

    let first = settings::create_default_user_settings(&db).await.unwrap();
    let second = settings::create_default_user_settings(&db).await.unwrap();
    assert_eq!(first, second);

    let (service_a, service_b) = (SettingsService::default(), SettingsService::default());
    let (a, b) = tokio::join!(service_a.app_settings(&db), service_b.app_settings(&db));
    assert_eq!(a.unwrap(), b.unwrap());
}
