//! Software catalog

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;
use tracing::info;

use supermanager_auth::UserInfo;
use supermanager_common::DEFAULT_STATUS;
use supermanager_persistence::entity::{softwares, users};
use supermanager_persistence::query::{FilterField, FilterKind, fetch_page};
use supermanager_persistence::{Page, PageRequest};

use crate::model::{CatalogItem, SoftwareForm, SoftwareItem};
use crate::service::{audit_users, guard_core, list_query, lookup_user, not_found};

pub const RESOURCE: &str = "softwares";

pub const FILTERS: &[FilterField<softwares::Column>] = &[
    FilterField::new("id", softwares::Column::Id, FilterKind::Integer),
    FilterField::new("title", softwares::Column::Title, FilterKind::Text),
    FilterField::new("description", softwares::Column::Description, FilterKind::Text),
    FilterField::new("version", softwares::Column::Version, FilterKind::Text),
    FilterField::new("code_name", softwares::Column::CodeName, FilterKind::Text),
    FilterField::new("status", softwares::Column::Status, FilterKind::Integer),
    FilterField::new("is_deprecated", softwares::Column::IsDeprecated, FilterKind::Boolean),
    FilterField::new("sort_order", softwares::Column::SortOrder, FilterKind::Integer),
    FilterField::new("creator", softwares::Column::CreatorId, FilterKind::Integer),
    FilterField::new("updater", softwares::Column::UpdaterId, FilterKind::Integer),
    FilterField::new("created_at", softwares::Column::CreatedAt, FilterKind::DateTime),
    FilterField::new("updated_at", softwares::Column::UpdatedAt, FilterKind::DateTime),
];

fn to_item(model: &softwares::Model, users: &HashMap<i32, UserInfo>) -> SoftwareItem {
    SoftwareItem {
        catalog: CatalogItem {
            id: model.id,
            title: model.title.clone(),
            description: model.description.clone(),
            code_name: model.code_name.clone(),
            status: model.status,
            is_core: model.is_core,
            is_deprecated: model.is_deprecated,
            sort_order: model.sort_order,
            creator: lookup_user(users, Some(model.creator_id)),
            updater: lookup_user(users, model.updater_id),
            created_at: model.created_at,
            updated_at: model.updated_at,
        },
        version: model.version.clone(),
    }
}

async fn render(db: &DatabaseConnection, model: softwares::Model) -> anyhow::Result<SoftwareItem> {
    let users = audit_users(db, std::slice::from_ref(&model)).await?;
    Ok(to_item(&model, &users))
}

pub async fn list(
    db: &DatabaseConnection,
    params: &HashMap<String, String>,
    request: PageRequest,
) -> anyhow::Result<Page<SoftwareItem>> {
    let (condition, ordering) = list_query(params, FILTERS, softwares::Column::Id)?;

    let page = fetch_page(db, softwares::Entity::find().filter(condition), ordering, request).await?;
    let users = audit_users(db, &page.results).await?;

    Ok(page.map(|m| to_item(&m, &users)))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> anyhow::Result<softwares::Model> {
    softwares::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub async fn get(db: &DatabaseConnection, id: i32) -> anyhow::Result<SoftwareItem> {
    let model = find(db, id).await?;
    render(db, model).await
}

fn apply(active: &mut softwares::ActiveModel, form: &SoftwareForm) {
    let base = &form.catalog.base;
    apply_base_form!(active, base);
    if let Some(v) = form.catalog.is_deprecated {
        active.is_deprecated = Set(v);
    }
    if let Some(v) = &form.version {
        active.version = Set(v.clone());
    }
}

pub async fn create(
    db: &DatabaseConnection,
    actor: &users::Model,
    form: &SoftwareForm,
) -> anyhow::Result<SoftwareItem> {
    form.errors(false).into_result()?;

    let mut active = softwares::ActiveModel {
        description: Set(None),
        version: Set(None),
        code_name: Set(None),
        is_core: Set(false),
        is_deprecated: Set(false),
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
    form: &SoftwareForm,
    partial: bool,
) -> anyhow::Result<SoftwareItem> {
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

    softwares::Entity::delete_by_id(model.id).exec(db).await?;
    info!(resource = RESOURCE, id = id, "Record deleted");

    Ok(())
}
