//! Device attribute catalogs
//!
//! The eight catalogs share one table layout, so their services are generated
//! by [`catalog_service!`]. Each generated module exposes `list`, `find`,
//! `get`, `create`, `update` and `delete`.

/// Generates the service module of a device attribute catalog.
macro_rules! catalog_service {
    ($(#[$doc:meta])* $module:ident, $resource:literal) => {
        $(#[$doc])*
        pub mod $module {
            use std::collections::HashMap;

            use chrono::Utc;
            use sea_orm::*;
            use tracing::info;

            use supermanager_auth::UserInfo;
            use supermanager_common::DEFAULT_STATUS;
            use supermanager_persistence::entity::$module as entity;
            use supermanager_persistence::entity::users;
            use supermanager_persistence::query::{FilterField, FilterKind, fetch_page};
            use supermanager_persistence::{Page, PageRequest};

            use crate::model::{CatalogForm, CatalogItem};
            use crate::service::{audit_users, guard_core, list_query, lookup_user, not_found};

            /// Name used in the core-record message
            pub const RESOURCE: &str = $resource;

            pub const FILTERS: &[FilterField<entity::Column>] = &[
                FilterField::new("id", entity::Column::Id, FilterKind::Integer),
                FilterField::new("title", entity::Column::Title, FilterKind::Text),
                FilterField::new("description", entity::Column::Description, FilterKind::Text),
                FilterField::new("code_name", entity::Column::CodeName, FilterKind::Text),
                FilterField::new("status", entity::Column::Status, FilterKind::Integer),
                FilterField::new("is_deprecated", entity::Column::IsDeprecated, FilterKind::Boolean),
                FilterField::new("sort_order", entity::Column::SortOrder, FilterKind::Integer),
                FilterField::new("creator", entity::Column::CreatorId, FilterKind::Integer),
                FilterField::new("updater", entity::Column::UpdaterId, FilterKind::Integer),
                FilterField::new("created_at", entity::Column::CreatedAt, FilterKind::DateTime),
                FilterField::new("updated_at", entity::Column::UpdatedAt, FilterKind::DateTime),
            ];

            pub fn to_item(model: &entity::Model, users: &HashMap<i32, UserInfo>) -> CatalogItem {
                CatalogItem {
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
                }
            }

            async fn render(db: &DatabaseConnection, model: entity::Model) -> anyhow::Result<CatalogItem> {
                let users = audit_users(db, std::slice::from_ref(&model)).await?;
                Ok(to_item(&model, &users))
            }

            pub async fn list(
                db: &DatabaseConnection,
                params: &HashMap<String, String>,
                request: PageRequest,
            ) -> anyhow::Result<Page<CatalogItem>> {
                let (condition, ordering) = list_query(params, FILTERS, entity::Column::Id)?;

                let page = fetch_page(db, entity::Entity::find().filter(condition), ordering, request).await?;
                let users = audit_users(db, &page.results).await?;

                Ok(page.map(|m| to_item(&m, &users)))
            }

            pub async fn find(db: &DatabaseConnection, id: i32) -> anyhow::Result<entity::Model> {
                entity::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .ok_or_else(not_found)
            }

            pub async fn get(db: &DatabaseConnection, id: i32) -> anyhow::Result<CatalogItem> {
                let model = find(db, id).await?;
                render(db, model).await
            }

            pub async fn create(
                db: &DatabaseConnection,
                actor: &users::Model,
                form: &CatalogForm,
            ) -> anyhow::Result<CatalogItem> {
                form.errors(false).into_result()?;

                let mut active = entity::ActiveModel {
                    is_core: Set(false),
                    is_deprecated: Set(form.is_deprecated.unwrap_or(false)),
                    creator_id: Set(actor.id),
                    updater_id: Set(None),
                    created_at: Set(Utc::now()),
                    updated_at: Set(None),
                    description: Set(None),
                    code_name: Set(None),
                    sort_order: Set(None),
                    ..Default::default()
                };
                apply_base_form!(active, &form.base);
                active.status = Set(DEFAULT_STATUS);

                let model = active.insert(db).await?;
                info!(resource = RESOURCE, id = model.id, creator = actor.id, "Record created");

                render(db, model).await
            }

            /// `partial` is PATCH: only the keys present are validated.
            pub async fn update(
                db: &DatabaseConnection,
                actor: &users::Model,
                id: i32,
                form: &CatalogForm,
                partial: bool,
            ) -> anyhow::Result<CatalogItem> {
                let model = find(db, id).await?;
                guard_core(model.is_core, actor, RESOURCE)?;
                form.errors(partial).into_result()?;

                let mut active = model.into_active_model();
                apply_base_form!(active, &form.base);
                if let Some(v) = form.is_deprecated {
                    active.is_deprecated = Set(v);
                }
                active.updater_id = Set(Some(actor.id));
                active.updated_at = Set(Some(Utc::now()));

                let model = active.update(db).await?;
                info!(resource = RESOURCE, id = model.id, updater = actor.id, "Record updated");

                render(db, model).await
            }

            pub async fn delete(db: &DatabaseConnection, actor: &users::Model, id: i32) -> anyhow::Result<()> {
                let model = find(db, id).await?;
                guard_core(model.is_core, actor, RESOURCE)?;

                entity::Entity::delete_by_id(model.id).exec(db).await?;
                info!(resource = RESOURCE, id = id, "Record deleted");

                Ok(())
            }
        }
    };
}

catalog_service!(
    /// `/device-types`
    device_types,
    "device types"
);
catalog_service!(
    /// `/device-marks`
    device_marks,
    "device marks"
);
catalog_service!(
    /// `/device-models`
    device_models,
    "device models"
);
catalog_service!(
    /// `/device-systems`
    device_systems,
    "device systems"
);
catalog_service!(
    /// `/device-builds`
    device_builds,
    "device builds"
);
catalog_service!(
    /// `/device-processors`
    device_processors,
    "device processors"
);
catalog_service!(
    /// `/device-rams`
    device_rams,
    "device rams"
);
catalog_service!(
    /// `/device-disks`
    device_disks,
    "device disks"
);
