//! Location zones

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;
use tracing::info;

use supermanager_auth::UserInfo;
use supermanager_common::DEFAULT_STATUS;
use supermanager_persistence::entity::{location_zones, locations, users};
use supermanager_persistence::query::{FilterField, FilterKind, fetch_page};
use supermanager_persistence::{Page, PageRequest};

use crate::model::{LocationItem, LocationZoneForm, LocationZoneItem};
use crate::service::location;
use crate::service::{audit_users, guard_core, list_query, lookup_user, not_found};

pub const RESOURCE: &str = "location zones";

pub const FILTERS: &[FilterField<location_zones::Column>] = &[
    FilterField::new("id", location_zones::Column::Id, FilterKind::Integer),
    FilterField::new("title", location_zones::Column::Title, FilterKind::Text),
    FilterField::new("description", location_zones::Column::Description, FilterKind::Text),
    FilterField::new("code_name", location_zones::Column::CodeName, FilterKind::Text),
    FilterField::new("status", location_zones::Column::Status, FilterKind::Integer),
    FilterField::new("manager", location_zones::Column::Manager, FilterKind::Text),
    FilterField::new("manager_email", location_zones::Column::ManagerEmail, FilterKind::Text),
    FilterField::new("manager_phone", location_zones::Column::ManagerPhone, FilterKind::Text),
    FilterField::new("manager_mobile", location_zones::Column::ManagerMobile, FilterKind::Text),
    FilterField::new("sort_order", location_zones::Column::SortOrder, FilterKind::Integer),
    FilterField::new("creator", location_zones::Column::CreatorId, FilterKind::Integer),
    FilterField::new("updater", location_zones::Column::UpdaterId, FilterKind::Integer),
    FilterField::new("created_at", location_zones::Column::CreatedAt, FilterKind::DateTime),
    FilterField::new("updated_at", location_zones::Column::UpdatedAt, FilterKind::DateTime),
];

/// Location titles grouped by zone, in id order
async fn location_titles(
    db: &DatabaseConnection,
    zone_ids: &[i32],
) -> anyhow::Result<HashMap<i32, Vec<String>>> {
    if zone_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = locations::Entity::find()
        .select_only()
        .column(locations::Column::LocationZoneId)
        .column(locations::Column::Title)
        .filter(locations::Column::LocationZoneId.is_in(zone_ids.to_vec()))
        .order_by_asc(locations::Column::Id)
        .into_tuple::<(i32, String)>()
        .all(db)
        .await?;

    let mut grouped: HashMap<i32, Vec<String>> = HashMap::new();
    for (zone_id, title) in rows {
        grouped.entry(zone_id).or_default().push(title);
    }

    Ok(grouped)
}

fn to_item(
    model: &location_zones::Model,
    titles: &HashMap<i32, Vec<String>>,
    users: &HashMap<i32, UserInfo>,
) -> LocationZoneItem {
    let locations = titles.get(&model.id).cloned().unwrap_or_default();

    LocationZoneItem {
        id: model.id,
        title: model.title.clone(),
        description: model.description.clone(),
        code_name: model.code_name.clone(),
        status: model.status,
        is_core: model.is_core,
        manager: model.manager.clone(),
        manager_email: model.manager_email.clone(),
        manager_phone: model.manager_phone.clone(),
        manager_mobile: model.manager_mobile.clone(),
        sort_order: model.sort_order,
        creator: lookup_user(users, Some(model.creator_id)),
        updater: lookup_user(users, model.updater_id),
        created_at: model.created_at,
        updated_at: model.updated_at,
        locations_count: locations.len() as u64,
        locations,
    }
}

async fn render(db: &DatabaseConnection, model: location_zones::Model) -> anyhow::Result<LocationZoneItem> {
    let titles = location_titles(db, &[model.id]).await?;
    let users = audit_users(db, std::slice::from_ref(&model)).await?;

    Ok(to_item(&model, &titles, &users))
}

pub async fn list(
    db: &DatabaseConnection,
    params: &HashMap<String, String>,
    request: PageRequest,
) -> anyhow::Result<Page<LocationZoneItem>> {
    let (condition, ordering) = list_query(params, FILTERS, location_zones::Column::Id)?;

    let page = fetch_page(db, location_zones::Entity::find().filter(condition), ordering, request).await?;

    let ids = page.results.iter().map(|m| m.id).collect::<Vec<i32>>();
    let titles = location_titles(db, &ids).await?;
    let users = audit_users(db, &page.results).await?;

    Ok(page.map(|m| to_item(&m, &titles, &users)))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> anyhow::Result<location_zones::Model> {
    location_zones::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub async fn get(db: &DatabaseConnection, id: i32) -> anyhow::Result<LocationZoneItem> {
    let model = find(db, id).await?;
    render(db, model).await
}

/// Locations of a zone, paged in id order. An unknown zone yields an empty page.
pub async fn locations(
    db: &DatabaseConnection,
    zone_id: i32,
    request: PageRequest,
) -> anyhow::Result<Page<LocationItem>> {
    let select = locations::Entity::find().filter(locations::Column::LocationZoneId.eq(zone_id));
    let page = fetch_page(db, select, vec![(locations::Column::Id, Order::Asc)], request).await?;

    location::render_page(db, page).await
}

fn apply(active: &mut location_zones::ActiveModel, form: &LocationZoneForm) {
    apply_base_form!(active, &form.base);

    if let Some(v) = &form.manager {
        active.manager = Set(v.clone());
    }
    if let Some(v) = &form.manager_email {
        active.manager_email = Set(v.clone());
    }
    if let Some(v) = &form.manager_phone {
        active.manager_phone = Set(v.clone());
    }
    if let Some(v) = &form.manager_mobile {
        active.manager_mobile = Set(v.clone());
    }
}

pub async fn create(
    db: &DatabaseConnection,
    actor: &users::Model,
    form: &LocationZoneForm,
) -> anyhow::Result<LocationZoneItem> {
    form.errors(false).into_result()?;

    let mut active = location_zones::ActiveModel {
        description: Set(None),
        code_name: Set(None),
        is_core: Set(false),
        manager: Set(String::new()),
        manager_email: Set(String::new()),
        manager_phone: Set(String::new()),
        manager_mobile: Set(String::new()),
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
    form: &LocationZoneForm,
    partial: bool,
) -> anyhow::Result<LocationZoneItem> {
    let model = find(db, id).await?;
    guard_core(model.is_core, actor, RESOURCE)?;
    form.errors(partial).into_result()?;

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

    location_zones::Entity::delete_by_id(model.id).exec(db).await?;
    info!(resource = RESOURCE, id = id, "Record deleted");

    Ok(())
}
