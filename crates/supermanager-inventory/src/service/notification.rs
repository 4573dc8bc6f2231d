//! Notifications

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;
use tracing::info;

use supermanager_auth::UserInfo;
use supermanager_common::DEFAULT_STATUS;
use supermanager_persistence::entity::{notification_types, notifications, users};
use supermanager_persistence::query::{FilterField, FilterKind, fetch_page};
use supermanager_persistence::{Page, PageRequest};

use crate::model::{Brief, NotificationForm, NotificationItem};
use crate::service::{audit_users, check_reference, list_query, load_briefs, lookup_user, not_found};

pub const FILTERS: &[FilterField<notifications::Column>] = &[
    FilterField::new("id", notifications::Column::Id, FilterKind::Integer),
    FilterField::new("title", notifications::Column::Title, FilterKind::Text),
    FilterField::new("description", notifications::Column::Description, FilterKind::Text),
    FilterField::new("status", notifications::Column::Status, FilterKind::Integer),
    FilterField::new("type", notifications::Column::TypeId, FilterKind::Integer),
    FilterField::new("module", notifications::Column::Module, FilterKind::Text),
    FilterField::new("module_id", notifications::Column::ModuleId, FilterKind::Integer),
    FilterField::new("sort_order", notifications::Column::SortOrder, FilterKind::Integer),
    FilterField::new("creator", notifications::Column::CreatorId, FilterKind::Integer),
    FilterField::new("updater", notifications::Column::UpdaterId, FilterKind::Integer),
    FilterField::new("created_at", notifications::Column::CreatedAt, FilterKind::DateTime),
    FilterField::new("updated_at", notifications::Column::UpdatedAt, FilterKind::DateTime),
];

fn to_item(
    model: &notifications::Model,
    types: &HashMap<i32, Brief>,
    users: &HashMap<i32, UserInfo>,
) -> NotificationItem {
    NotificationItem {
        id: model.id,
        title: model.title.clone(),
        description: model.description.clone(),
        status: model.status,
        notification_type: types
            .get(&model.type_id)
            .map(|t| t.title.clone())
            .unwrap_or_default(),
        module: model.module.clone(),
        module_id: model.module_id,
        sort_order: model.sort_order,
        creator: lookup_user(users, Some(model.creator_id)),
        updater: lookup_user(users, model.updater_id),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

async fn render_all(
    db: &DatabaseConnection,
    models: Vec<notifications::Model>,
) -> anyhow::Result<Vec<NotificationItem>> {
    let type_ids = models.iter().map(|m| m.type_id).collect::<Vec<i32>>();
    let types = load_briefs::<notification_types::Entity>(db, notification_types::Column::Id, &type_ids).await?;
    let users = audit_users(db, &models).await?;

    Ok(models.iter().map(|m| to_item(m, &types, &users)).collect())
}

async fn render(db: &DatabaseConnection, model: notifications::Model) -> anyhow::Result<NotificationItem> {
    render_all(db, vec![model])
        .await?
        .pop()
        .ok_or_else(not_found)
}

pub async fn list(
    db: &DatabaseConnection,
    params: &HashMap<String, String>,
    request: PageRequest,
) -> anyhow::Result<Page<NotificationItem>> {
    let (condition, ordering) = list_query(params, FILTERS, notifications::Column::Id)?;

    let mut page = fetch_page(db, notifications::Entity::find().filter(condition), ordering, request).await?;
    let items = render_all(db, std::mem::take(&mut page.results)).await?;

    Ok(Page::new(page.count, request, items))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> anyhow::Result<notifications::Model> {
    notifications::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub async fn get(db: &DatabaseConnection, id: i32) -> anyhow::Result<NotificationItem> {
    let model = find(db, id).await?;
    render(db, model).await
}

async fn validate(db: &DatabaseConnection, form: &NotificationForm, partial: bool) -> anyhow::Result<()> {
    let mut errors = form.errors(partial);
    check_reference::<notification_types::Entity>(db, &mut errors, "type_id", form.type_id).await?;

    errors.into_result()?;
    Ok(())
}

fn apply(active: &mut notifications::ActiveModel, form: &NotificationForm) {
    apply_base_form!(active, &form.base, without_code_name);

    if let Some(v) = form.type_id {
        active.type_id = Set(v);
    }
    if let Some(v) = &form.module {
        active.module = Set(v.clone());
    }
    if let Some(v) = form.module_id {
        active.module_id = Set(v);
    }
}

pub async fn create(
    db: &DatabaseConnection,
    actor: &users::Model,
    form: &NotificationForm,
) -> anyhow::Result<NotificationItem> {
    validate(db, form, false).await?;

    let mut active = notifications::ActiveModel {
        description: Set(None),
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
    info!(resource = "notifications", id = model.id, creator = actor.id, "Record created");

    render(db, model).await
}

pub async fn update(
    db: &DatabaseConnection,
    actor: &users::Model,
    id: i32,
    form: &NotificationForm,
    partial: bool,
) -> anyhow::Result<NotificationItem> {
    let model = find(db, id).await?;
    validate(db, form, partial).await?;

    let mut active = model.into_active_model();
    apply(&mut active, form);
    active.updater_id = Set(Some(actor.id));
    active.updated_at = Set(Some(Utc::now()));

    let model = active.update(db).await?;
    info!(resource = "notifications", id = model.id, updater = actor.id, "Record updated");

    render(db, model).await
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> anyhow::Result<()> {
    let result = notifications::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found());
    }

    info!(resource = "notifications", id = id, "Record deleted");
    Ok(())
}
