//! Devices

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;
use tracing::info;

use supermanager_auth::UserInfo;
use supermanager_common::DEFAULT_STATUS;
use supermanager_persistence::entity::{
    device_builds, device_disks, device_marks, device_models, device_processors, device_rams,
    device_systems, device_types, devices, locations, users,
};
use supermanager_persistence::query::{FilterField, FilterKind, fetch_page};
use supermanager_persistence::{Page, PageRequest};

use crate::model::{Brief, DeviceForm, DeviceItem};
use crate::service::{audit_users, check_reference, list_query, load_briefs, lookup_user, not_found};

pub const FILTERS: &[FilterField<devices::Column>] = &[
    FilterField::new("id", devices::Column::Id, FilterKind::Integer),
    FilterField::new("internal_id", devices::Column::InternalId, FilterKind::Text),
    FilterField::new("hostname", devices::Column::Hostname, FilterKind::Text),
    FilterField::new("status", devices::Column::Status, FilterKind::Integer),
    FilterField::new("location", devices::Column::LocationId, FilterKind::Integer),
    FilterField::new("type", devices::Column::TypeId, FilterKind::Integer),
    FilterField::new("mark", devices::Column::MarkId, FilterKind::Integer),
    FilterField::new("model", devices::Column::ModelId, FilterKind::Integer),
    FilterField::new("system", devices::Column::SystemId, FilterKind::Integer),
    FilterField::new("build", devices::Column::BuildId, FilterKind::Integer),
    FilterField::new("processor", devices::Column::ProcessorId, FilterKind::Integer),
    FilterField::new("ram", devices::Column::RamId, FilterKind::Integer),
    FilterField::new("disk", devices::Column::DiskId, FilterKind::Integer),
    FilterField::new("disk_internal_id", devices::Column::DiskInternalId, FilterKind::Text),
    FilterField::new("disk_serial", devices::Column::DiskSerial, FilterKind::Text),
    FilterField::new("network_ipv4", devices::Column::NetworkIpv4, FilterKind::Text),
    FilterField::new("network_ipv6", devices::Column::NetworkIpv6, FilterKind::Text),
    FilterField::new("network_mac", devices::Column::NetworkMac, FilterKind::Text),
    FilterField::new("remote_id", devices::Column::RemoteId, FilterKind::Text),
    FilterField::new("serial", devices::Column::Serial, FilterKind::Text),
    FilterField::new("sector", devices::Column::Sector, FilterKind::Text),
    FilterField::new("user_owner", devices::Column::UserOwner, FilterKind::Text),
    FilterField::new("notes", devices::Column::Notes, FilterKind::Text),
    FilterField::new("sort_order", devices::Column::SortOrder, FilterKind::Integer),
    FilterField::new("creator", devices::Column::CreatorId, FilterKind::Integer),
    FilterField::new("updater", devices::Column::UpdaterId, FilterKind::Integer),
    FilterField::new("created_at", devices::Column::CreatedAt, FilterKind::DateTime),
    FilterField::new("updated_at", devices::Column::UpdatedAt, FilterKind::DateTime),
];

struct Embedded {
    locations: HashMap<i32, Brief>,
    types: HashMap<i32, Brief>,
    marks: HashMap<i32, Brief>,
    models: HashMap<i32, Brief>,
    systems: HashMap<i32, Brief>,
    builds: HashMap<i32, Brief>,
    processors: HashMap<i32, Brief>,
    rams: HashMap<i32, Brief>,
    disks: HashMap<i32, Brief>,
    users: HashMap<i32, UserInfo>,
}

async fn load_related(db: &DatabaseConnection, models: &[devices::Model]) -> anyhow::Result<Embedded> {
    let ids = |f: fn(&devices::Model) -> i32| models.iter().map(f).collect::<Vec<i32>>();

    Ok(Embedded {
        locations: load_briefs::<locations::Entity>(db, locations::Column::Id, &ids(|m| m.location_id)).await?,
        types: load_briefs::<device_types::Entity>(db, device_types::Column::Id, &ids(|m| m.type_id)).await?,
        marks: load_briefs::<device_marks::Entity>(db, device_marks::Column::Id, &ids(|m| m.mark_id)).await?,
        models: load_briefs::<device_models::Entity>(db, device_models::Column::Id, &ids(|m| m.model_id))
            .await?,
        systems: load_briefs::<device_systems::Entity>(db, device_systems::Column::Id, &ids(|m| m.system_id))
            .await?,
        builds: load_briefs::<device_builds::Entity>(db, device_builds::Column::Id, &ids(|m| m.build_id))
            .await?,
        processors: load_briefs::<device_processors::Entity>(
            db,
            device_processors::Column::Id,
            &ids(|m| m.processor_id),
        )
        .await?,
        rams: load_briefs::<device_rams::Entity>(db, device_rams::Column::Id, &ids(|m| m.ram_id)).await?,
        disks: load_briefs::<device_disks::Entity>(db, device_disks::Column::Id, &ids(|m| m.disk_id)).await?,
        users: audit_users(db, models).await?,
    })
}

fn to_item(model: &devices::Model, related: &Embedded) -> DeviceItem {
    let brief = |map: &HashMap<i32, Brief>, id: i32| map.get(&id).cloned();

    DeviceItem {
        id: model.id,
        internal_id: model.internal_id.clone(),
        hostname: model.hostname.clone(),
        status: model.status,
        device_type: brief(&related.types, model.type_id),
        mark: brief(&related.marks, model.mark_id),
        model: brief(&related.models, model.model_id),
        system: brief(&related.systems, model.system_id),
        build: brief(&related.builds, model.build_id),
        processor: brief(&related.processors, model.processor_id),
        ram: brief(&related.rams, model.ram_id),
        disk: brief(&related.disks, model.disk_id),
        disk_internal_id: model.disk_internal_id.clone(),
        disk_serial: model.disk_serial.clone(),
        network_ipv4: model.network_ipv4.clone(),
        network_ipv6: model.network_ipv6.clone(),
        network_mac: model.network_mac.clone(),
        remote_id: model.remote_id.clone(),
        serial: model.serial.clone(),
        location: brief(&related.locations, model.location_id),
        user_owner: model.user_owner.clone(),
        sector: model.sector.clone(),
        notes: model.notes.clone(),
        sort_order: model.sort_order,
        creator: lookup_user(&related.users, Some(model.creator_id)),
        updater: lookup_user(&related.users, model.updater_id),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

async fn render(db: &DatabaseConnection, model: devices::Model) -> anyhow::Result<DeviceItem> {
    let related = load_related(db, std::slice::from_ref(&model)).await?;
    Ok(to_item(&model, &related))
}

pub async fn list(
    db: &DatabaseConnection,
    params: &HashMap<String, String>,
    request: PageRequest,
) -> anyhow::Result<Page<DeviceItem>> {
    let (condition, ordering) = list_query(params, FILTERS, devices::Column::Id)?;

    let page = fetch_page(db, devices::Entity::find().filter(condition), ordering, request).await?;
    let related = load_related(db, &page.results).await?;

    Ok(page.map(|m| to_item(&m, &related)))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> anyhow::Result<devices::Model> {
    devices::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub async fn get(db: &DatabaseConnection, id: i32) -> anyhow::Result<DeviceItem> {
    let model = find(db, id).await?;
    render(db, model).await
}

async fn validate(db: &DatabaseConnection, form: &DeviceForm, partial: bool) -> anyhow::Result<()> {
    let mut errors = form.errors(partial);

    check_reference::<locations::Entity>(db, &mut errors, "location_id", form.location_id).await?;
    check_reference::<device_types::Entity>(db, &mut errors, "type_id", form.type_id).await?;
    check_reference::<device_marks::Entity>(db, &mut errors, "mark_id", form.mark_id).await?;
    check_reference::<device_models::Entity>(db, &mut errors, "model_id", form.model_id).await?;
    check_reference::<device_systems::Entity>(db, &mut errors, "system_id", form.system_id).await?;
    check_reference::<device_builds::Entity>(db, &mut errors, "build_id", form.build_id).await?;
    check_reference::<device_processors::Entity>(db, &mut errors, "processor_id", form.processor_id).await?;
    check_reference::<device_rams::Entity>(db, &mut errors, "ram_id", form.ram_id).await?;
    check_reference::<device_disks::Entity>(db, &mut errors, "disk_id", form.disk_id).await?;

    errors.into_result()?;
    Ok(())
}

fn apply(active: &mut devices::ActiveModel, form: &DeviceForm) {
    if let Some(v) = &form.internal_id {
        active.internal_id = Set(v.clone());
    }
    if let Some(v) = form.status {
        active.status = Set(v);
    }

    let references = [
        devices::Column::LocationId,
        devices::Column::TypeId,
        devices::Column::MarkId,
        devices::Column::ModelId,
        devices::Column::SystemId,
        devices::Column::BuildId,
        devices::Column::ProcessorId,
        devices::Column::RamId,
        devices::Column::DiskId,
    ];
    for (column, (_, value)) in references.into_iter().zip(form.references()) {
        if let Some(v) = value {
            active.set(column, v.into());
        }
    }

    let texts = [
        devices::Column::Hostname,
        devices::Column::DiskInternalId,
        devices::Column::DiskSerial,
        devices::Column::NetworkIpv4,
        devices::Column::NetworkIpv6,
        devices::Column::NetworkMac,
        devices::Column::RemoteId,
        devices::Column::Serial,
        devices::Column::Sector,
        devices::Column::UserOwner,
    ];
    for (column, (_, value)) in texts.into_iter().zip(form.optional_texts()) {
        if let Some(v) = value {
            active.set(column, v.clone().into());
        }
    }

    if let Some(v) = &form.notes {
        active.notes = Set(v.clone());
    }
    if let Some(v) = form.sort_order {
        active.sort_order = Set(v);
    }
}

pub async fn create(
    db: &DatabaseConnection,
    actor: &users::Model,
    form: &DeviceForm,
) -> anyhow::Result<DeviceItem> {
    validate(db, form, false).await?;

    let mut active = devices::ActiveModel {
        hostname: Set(None),
        disk_internal_id: Set(None),
        disk_serial: Set(None),
        network_ipv4: Set(None),
        network_ipv6: Set(None),
        network_mac: Set(None),
        remote_id: Set(None),
        serial: Set(None),
        sector: Set(None),
        user_owner: Set(None),
        notes: Set(None),
        sort_order: Set(None),
        creator_id: Set(actor.id),
        updater_id: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
        ..Default::default()
    };
    apply(&mut active, form);
    active.status = Set(DEFAULT_STATUS);

    let model = active.insert(db).await?;
    info!(resource = "devices", id = model.id, creator = actor.id, "Record created");

    render(db, model).await
}

pub async fn update(
    db: &DatabaseConnection,
    actor: &users::Model,
    id: i32,
    form: &DeviceForm,
    partial: bool,
) -> anyhow::Result<DeviceItem> {
    let model = find(db, id).await?;
    validate(db, form, partial).await?;

    let mut active = model.into_active_model();
    apply(&mut active, form);
    active.updater_id = Set(Some(actor.id));
    active.updated_at = Set(Some(Utc::now()));

    let model = active.update(db).await?;
    info!(resource = "devices", id = model.id, updater = actor.id, "Record updated");

    render(db, model).await
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> anyhow::Result<()> {
    let result = devices::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found());
    }

    info!(resource = "devices", id = id, "Record deleted");
    Ok(())
}
