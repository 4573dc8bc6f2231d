//! Notification types

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;
use tracing::info;

use supermanager_auth::UserInfo;
use supermanager_common::DEFAULT_STATUS;
use supermanager_persistence::entity::{notification_types, users};
use supermanager_persistence::query::{FilterField, FilterKind, fetch_page};
use supermanager_persistence::{Page, PageRequest};

use crate::model::{BaseForm, NotificationTypeItem};
use crate::service::{audit_users, guard_core, list_query, lookup_user, not_found};

pub const RESOURCE: &str = "notification types";

pub const FILTERS: &[FilterField<notification_types::Column>] = &[
    FilterField::new("id", notification_types::Column::Id, FilterKind::Integer),
    FilterField::new("title", notification_types::Column::Title, FilterKind::Text),
    FilterField::new("description", notification_types::Column::Description, FilterKind::Text),
    FilterField::new("status", notification_types::Column::Status, FilterKind::Integer),
    FilterField::new("sort_order", notification_types::Column::SortOrder, FilterKind::Integer),
    FilterField::new("creator", notification_types::Column::CreatorId, FilterKind::Integer),
    FilterField::new("updater", notification_types::Column::UpdaterId, FilterKind::Integer),
    FilterField::new("created_at", notification_types::Column::CreatedAt, FilterKind::DateTime),
    FilterField::new("updated_at", notification_types::Column::UpdatedAt, FilterKind::DateTime),
];

fn to_item(model: &notification_types::Model, users: &HashMap<i32, UserInfo>) -> NotificationTypeItem {
    NotificationTypeItem {
        id: model.id,
        title: model.title.clone(),
        description: model.description.clone(),
        status: model.status,
        is_core: model.is_core,
        sort_order: model.sort_order,
        creator: lookup_user(users, Some(model.creator_id)),
        updater: lookup_user(users, model.updater_id),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

async fn render(
    db: &DatabaseConnection,
    model: notification_types::Model,
) -> anyhow::Result<NotificationTypeItem> {
    let users = audit_users(db, std::slice::from_ref(&model)).await?;
    Ok(to_item(&model, &users))
}

pub async fn list(
    db: &DatabaseConnection,
    params: &HashMap<String, String>,
    request: PageRequest,
) -> anyhow::Result<Page<NotificationTypeItem>> {
    let (condition, ordering) = list_query(params, FILTERS, notification_types::Column::Id)?;

    let page = fetch_page(db, notification_types::Entity::find().filter(condition), ordering, request).await?;
    let users = audit_users(db, &page.results).await?;

    Ok(page.map(|m| to_item(&m, &users)))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> anyhow::Result<notification_types::Model> {
    notification_types::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub async fn get(db: &DatabaseConnection, id: i32) -> anyhow::Result<NotificationTypeItem> {
    let model = find(db, id).await?;
    render(db, model).await
}

pub async fn create(
    db: &DatabaseConnection,
    actor: &users::Model,
    form: &BaseForm,
) -> anyhow::Result<NotificationTypeItem> {
    form.errors(false).into_result()?;

    let mut active = notification_types::ActiveModel {
        description: Set(None),
        is_core: Set(false),
        sort_order: Set(None),
        creator_id: Set(actor.id),
        updater_id: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
        ..Default::default()
    };
    apply_base_form!(active, form, without_code_name);
    active.status = Set(DEFAULT_STATUS);

    let model = active.insert(db).await?;
    info!(resource = RESOURCE, id = model.id, creator = actor.id, "Record created");

    render(db, model).await
}

pub async fn update(
    db: &DatabaseConnection,
    actor: &users::Model,
    id: i32,
    form: &BaseForm,
    partial: bool,
) -> anyhow::Result<NotificationTypeItem> {
    let model = find(db, id).await?;
    guard_core(model.is_core, actor, RESOURCE)?;
    form.errors(partial).into_result()?;

    let mut active = model.into_active_model();
    apply_base_form!(active, form, without_code_name);
    active.updater_id = Set(Some(actor.id));
    active.updated_at = Set(Some(Utc::now()));

    let model = active.update(db).await?;
    info!(resource = RESOURCE, id = model.id, updater = actor.id, "Record updated");

    render(db, model).await
}

pub async fn delete(db: &DatabaseConnection, actor: &users::Model, id: i32) -> anyhow::Result<()> {
    let model = find(db, id).await?;
    guard_core(model.is_core, actor, RESOURCE)?;

    notification_types::Entity::delete_by_id(model.id).exec(db).await?;
    info!(resource = RESOURCE, id = id, "Record deleted");

    Ok(())
}
