//! Software installed on devices

use std::collections::HashMap;

use sea_orm::*;
use tracing::info;

use supermanager_common::{NON_FIELD_ERRORS, SuperManagerError};
use supermanager_persistence::entity::{device_softwares, devices, softwares};
use supermanager_persistence::query::{FilterField, FilterKind, fetch_page};
use supermanager_persistence::{Page, PageRequest};

use crate::model::{DeviceSoftwareForm, DeviceSoftwareItem};
use crate::service::{list_query, not_found};

pub const IDS_REQUIRED: &str = "device_id and software_id are required";
pub const DEVICE_NOT_FOUND: &str = "Device does not exist";
pub const SOFTWARE_NOT_FOUND: &str = "Software does not exist";
pub const NOT_UNIQUE: &str = "The fields device, software must make a unique set.";

pub const FILTERS: &[FilterField<device_softwares::Column>] = &[
    FilterField::new("id", device_softwares::Column::Id, FilterKind::Integer),
    FilterField::new("device", device_softwares::Column::DeviceId, FilterKind::Integer),
    FilterField::new("software", device_softwares::Column::SoftwareId, FilterKind::Integer),
    FilterField::new("installed_at", device_softwares::Column::InstalledAt, FilterKind::DateTime),
];

impl From<device_softwares::Model> for DeviceSoftwareItem {
    fn from(value: device_softwares::Model) -> Self {
        Self {
            id: value.id,
            device: value.device_id,
            software: value.software_id,
            installed_at: value.installed_at,
        }
    }
}

pub async fn list(
    db: &DatabaseConnection,
    params: &HashMap<String, String>,
    request: PageRequest,
) -> anyhow::Result<Page<DeviceSoftwareItem>> {
    let (condition, ordering) = list_query(params, FILTERS, device_softwares::Column::Id)?;

    let page = fetch_page(db, device_softwares::Entity::find().filter(condition), ordering, request).await?;

    Ok(page.map(DeviceSoftwareItem::from))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> anyhow::Result<device_softwares::Model> {
    device_softwares::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub async fn get(db: &DatabaseConnection, id: i32) -> anyhow::Result<DeviceSoftwareItem> {
    Ok(find(db, id).await?.into())
}

async fn ensure_unique(
    db: &DatabaseConnection,
    device_id: i32,
    software_id: i32,
    exclude: Option<i32>,
) -> anyhow::Result<()> {
    let mut query = device_softwares::Entity::find()
        .filter(device_softwares::Column::DeviceId.eq(device_id))
        .filter(device_softwares::Column::SoftwareId.eq(software_id));
    if let Some(id) = exclude {
        query = query.filter(device_softwares::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(SuperManagerError::field(NON_FIELD_ERRORS, NOT_UNIQUE).into());
    }
    Ok(())
}

/// The unique index still guards against a concurrent insert of the same pair.
fn link_error(err: DbErr) -> anyhow::Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            SuperManagerError::field(NON_FIELD_ERRORS, NOT_UNIQUE).into()
        }
        _ => err.into(),
    }
}

async fn ensure_software(db: &DatabaseConnection, software_id: i32) -> anyhow::Result<()> {
    if softwares::Entity::find_by_id(software_id).one(db).await?.is_none() {
        return Err(SuperManagerError::IllegalArgument(SOFTWARE_NOT_FOUND.to_string()).into());
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, form: &DeviceSoftwareForm) -> anyhow::Result<DeviceSoftwareItem> {
    let (Some(device_id), Some(software_id)) = (form.device_id, form.software_id) else {
        return Err(SuperManagerError::IllegalArgument(IDS_REQUIRED.to_string()).into());
    };

    if devices::Entity::find_by_id(device_id).one(db).await?.is_none() {
        return Err(SuperManagerError::IllegalArgument(DEVICE_NOT_FOUND.to_string()).into());
    }
    ensure_software(db, software_id).await?;
    ensure_unique(db, device_id, software_id, None).await?;

    let model = device_softwares::ActiveModel {
        device_id: Set(device_id),
        software_id: Set(software_id),
        installed_at: Set(form.installed_at.flatten()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(link_error)?;

    info!(device = device_id, software = software_id, "Software linked to device");
    Ok(model.into())
}

/// Only `software_id` is writable after creation.
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    form: &DeviceSoftwareForm,
) -> anyhow::Result<DeviceSoftwareItem> {
    let model = find(db, id).await?;

    let Some(software_id) = form.software_id else {
        return Ok(model.into());
    };
    if software_id == model.software_id {
        return Ok(model.into());
    }

    ensure_software(db, software_id).await?;
    ensure_unique(db, model.device_id, software_id, Some(model.id)).await?;

    let mut active = model.into_active_model();
    active.software_id = Set(software_id);
    let model = active.update(db).await.map_err(link_error)?;

    Ok(model.into())
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> anyhow::Result<()> {
    let result = device_softwares::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use supermanager_migration::{Migrator, MigratorTrait};

    use super::*;

    #[tokio::test]
    async fn test_duplicate_insert_maps_to_field_error() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db.execute_unprepared("PRAGMA foreign_keys = OFF").await.unwrap();

        let link = || device_softwares::ActiveModel {
            device_id: Set(3),
            software_id: Set(4),
            ..Default::default()
        };
        link().insert(&db).await.unwrap();
        let err = link().insert(&db).await.map_err(link_error).unwrap_err();

        match err.downcast::<SuperManagerError>() {
            Ok(SuperManagerError::Validation(errors)) => {
                assert_eq!(errors.get(NON_FIELD_ERRORS).unwrap()[0], NOT_UNIQUE);
            }
            other => panic!("expected a validation error, got {:?}", other),
        }

        let err = link_error(DbErr::Custom("boom".to_string()));
        assert!(err.downcast_ref::<SuperManagerError>().is_none());
    }
}
