//! Locations

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::info;

use supermanager_auth::UserInfo;
use supermanager_common::DEFAULT_STATUS;
use supermanager_persistence::entity::{devices, location_zones, locations, users};
use supermanager_persistence::query::{FilterField, FilterKind, fetch_page};
use supermanager_persistence::{Page, PageRequest};

use crate::model::{Brief, LocationForm, LocationItem};
use crate::service::{
    audit_users, check_reference, guard_core, list_query, load_briefs, lookup_user, not_found,
};

pub const RESOURCE: &str = "locations";

pub const FILTERS: &[FilterField<locations::Column>] = &[
    FilterField::new("id", locations::Column::Id, FilterKind::Integer),
    FilterField::new("title", locations::Column::Title, FilterKind::Text),
    FilterField::new("description", locations::Column::Description, FilterKind::Text),
    FilterField::new("code_name", locations::Column::CodeName, FilterKind::Text),
    FilterField::new("status", locations::Column::Status, FilterKind::Integer),
    FilterField::new("location_zone", locations::Column::LocationZoneId, FilterKind::Integer),
    FilterField::new("manager", locations::Column::Manager, FilterKind::Text),
    FilterField::new("manager_email", locations::Column::ManagerEmail, FilterKind::Text),
    FilterField::new("manager_phone", locations::Column::ManagerPhone, FilterKind::Text),
    FilterField::new("manager_mobile", locations::Column::ManagerMobile, FilterKind::Text),
    FilterField::new("collaborator", locations::Column::Collaborator, FilterKind::Text),
    FilterField::new("collaborator_email", locations::Column::CollaboratorEmail, FilterKind::Text),
    FilterField::new("collaborator_phone", locations::Column::CollaboratorPhone, FilterKind::Text),
    FilterField::new("collaborator_mobile", locations::Column::CollaboratorMobile, FilterKind::Text),
    FilterField::new("phone", locations::Column::Phone, FilterKind::Text),
    FilterField::new("mobile", locations::Column::Mobile, FilterKind::Text),
    FilterField::new("address", locations::Column::Address, FilterKind::Text),
    FilterField::new("city", locations::Column::City, FilterKind::Text),
    FilterField::new("state", locations::Column::State, FilterKind::Text),
    FilterField::new("zip_code", locations::Column::ZipCode, FilterKind::Text),
    FilterField::new("country", locations::Column::Country, FilterKind::Text),
    FilterField::new("latitude", locations::Column::Latitude, FilterKind::Float),
    FilterField::new("longitude", locations::Column::Longitude, FilterKind::Float),
    FilterField::new("sort_order", locations::Column::SortOrder, FilterKind::Integer),
    FilterField::new("creator", locations::Column::CreatorId, FilterKind::Integer),
    FilterField::new("updater", locations::Column::UpdaterId, FilterKind::Integer),
    FilterField::new("created_at", locations::Column::CreatedAt, FilterKind::DateTime),
    FilterField::new("updated_at", locations::Column::UpdatedAt, FilterKind::DateTime),
];

struct Embedded {
    zones: HashMap<i32, Brief>,
    devices: HashMap<i32, u64>,
    users: HashMap<i32, UserInfo>,
}

async fn devices_per_location(
    db: &DatabaseConnection,
    ids: &[i32],
) -> anyhow::Result<HashMap<i32, u64>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = devices::Entity::find()
        .select_only()
        .column(devices::Column::LocationId)
        .column_as(Expr::col(devices::Column::Id).count(), "count")
        .filter(devices::Column::LocationId.is_in(ids.to_vec()))
        .group_by(devices::Column::LocationId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|(id, n)| (id, n as u64)).collect())
}

async fn load_related(db: &DatabaseConnection, models: &[locations::Model]) -> anyhow::Result<Embedded> {
    let zone_ids = models.iter().map(|m| m.location_zone_id).collect::<Vec<i32>>();
    let ids = models.iter().map(|m| m.id).collect::<Vec<i32>>();

    Ok(Embedded {
        zones: load_briefs::<location_zones::Entity>(db, location_zones::Column::Id, &zone_ids).await?,
        devices: devices_per_location(db, &ids).await?,
        users: audit_users(db, models).await?,
    })
}

fn to_item(model: &locations::Model, related: &Embedded) -> LocationItem {
    LocationItem {
        id: model.id,
        title: model.title.clone(),
        description: model.description.clone(),
        code_name: model.code_name.clone(),
        status: model.status,
        is_core: model.is_core,
        location_zone: related.zones.get(&model.location_zone_id).cloned(),
        manager: model.manager.clone(),
        manager_email: model.manager_email.clone(),
        manager_phone: model.manager_phone.clone(),
        manager_mobile: model.manager_mobile.clone(),
        collaborator: model.collaborator.clone(),
        collaborator_email: model.collaborator_email.clone(),
        collaborator_phone: model.collaborator_phone.clone(),
        collaborator_mobile: model.collaborator_mobile.clone(),
        phone: model.phone.clone(),
        mobile: model.mobile.clone(),
        address: model.address.clone(),
        city: model.city.clone(),
        state: model.state.clone(),
        zip_code: model.zip_code.clone(),
        country: model.country.clone(),
        latitude: model.latitude,
        longitude: model.longitude,
        sort_order: model.sort_order,
        creator: lookup_user(&related.users, Some(model.creator_id)),
        updater: lookup_user(&related.users, model.updater_id),
        created_at: model.created_at,
        updated_at: model.updated_at,
        devices_count: related.devices.get(&model.id).copied().unwrap_or_default(),
    }
}

/// Renders a page of locations with their zone, device count and audit users.
pub async fn render_page(
    db: &DatabaseConnection,
    page: Page<locations::Model>,
) -> anyhow::Result<Page<LocationItem>> {
    let related = load_related(db, &page.results).await?;
    Ok(page.map(|m| to_item(&m, &related)))
}

async fn render(db: &DatabaseConnection, model: locations::Model) -> anyhow::Result<LocationItem> {
    let related = load_related(db, std::slice::from_ref(&model)).await?;
    Ok(to_item(&model, &related))
}

pub async fn list(
    db: &DatabaseConnection,
    params: &HashMap<String, String>,
    request: PageRequest,
) -> anyhow::Result<Page<LocationItem>> {
    let (condition, ordering) = list_query(params, FILTERS, locations::Column::Id)?;

    let page = fetch_page(db, locations::Entity::find().filter(condition), ordering, request).await?;

    render_page(db, page).await
}

pub async fn find(db: &DatabaseConnection, id: i32) -> anyhow::Result<locations::Model> {
    locations::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub async fn get(db: &DatabaseConnection, id: i32) -> anyhow::Result<LocationItem> {
    let model = find(db, id).await?;
    render(db, model).await
}

async fn validate(db: &DatabaseConnection, form: &LocationForm, partial: bool) -> anyhow::Result<()> {
    let mut errors = form.errors(partial);
    check_reference::<location_zones::Entity>(db, &mut errors, "location_zone_id", form.location_zone_id)
        .await?;

    errors.into_result()?;
    Ok(())
}

fn apply(active: &mut locations::ActiveModel, form: &LocationForm) {
    apply_base_form!(active, &form.base);

    if let Some(v) = form.location_zone_id {
        active.location_zone_id = Set(v);
    }

    let columns = [
        locations::Column::Manager,
        locations::Column::ManagerEmail,
        locations::Column::ManagerPhone,
        locations::Column::ManagerMobile,
        locations::Column::Collaborator,
        locations::Column::CollaboratorEmail,
        locations::Column::CollaboratorPhone,
        locations::Column::CollaboratorMobile,
        locations::Column::Phone,
        locations::Column::Mobile,
        locations::Column::Address,
        locations::Column::City,
        locations::Column::State,
        locations::Column::ZipCode,
        locations::Column::Country,
    ];
    for (column, (_, value)) in columns.into_iter().zip(form.contact_fields()) {
        if let Some(v) = value {
            active.set(column, v.clone().into());
        }
    }

    if let Some(v) = form.latitude {
        active.latitude = Set(v);
    }
    if let Some(v) = form.longitude {
        active.longitude = Set(v);
    }
}

pub async fn create(
    db: &DatabaseConnection,
    actor: &users::Model,
    form: &LocationForm,
) -> anyhow::Result<LocationItem> {
    validate(db, form, false).await?;

    let blank = || Set(String::new());
    let mut active = locations::ActiveModel {
        description: Set(None),
        code_name: Set(None),
        is_core: Set(false),
        manager: blank(),
        manager_email: blank(),
        manager_phone: blank(),
        manager_mobile: blank(),
        collaborator: blank(),
        collaborator_email: blank(),
        collaborator_phone: blank(),
        collaborator_mobile: blank(),
        phone: blank(),
        mobile: blank(),
        address: blank(),
        city: blank(),
        state: blank(),
        zip_code: blank(),
        country: blank(),
        latitude: Set(None),
        longitude: Set(None),
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
    info!(resource = RESOURCE, id = model.id, creator = actor.id, "Record created");

    render(db, model).await
}

pub async fn update(
    db: &DatabaseConnection,
    actor: &users::Model,
    id: i32,
    form: &LocationForm,
    partial: bool,
) -> anyhow::Result<LocationItem> {
    let model = find(db, id).await?;
    guard_core(model.is_core, actor, RESOURCE)?;
    validate(db, form, partial).await?;

    let mut active = model.into_active_model();
    apply(&mut active, form);
    active.updater_id = Set(Some(actor.id));
    active.updated_at = Set(Some(Utc::now()));

    let model = active.update(db).await?;
    info!(resource = RESOURCE, id = model.id, updater = actor.id, "Record updated");

    render(db, model).await
}

pub async fn delete(db: &DatabaseConnection, actor: &users::Model, id: i32) -> anyhow::Result<()> {
    let model = find(db, id).await?;
    guard_core(model.is_core, actor, RESOURCE)?;

    locations::Entity::delete_by_id(model.id).exec(db).await?;
    info!(resource = RESOURCE, id = id, "Record deleted");

    Ok(())
}
