//! `SeaORM` entities
//!
//! The eight device attribute catalogs share one table layout and are
//! generated by [`device_catalog_entity!`]. Every other table has its own file.

pub mod prelude;

pub mod app_settings;
pub mod device_softwares;
pub mod devices;
pub mod location_zones;
pub mod locations;
pub mod notification_types;
pub mod notifications;
pub mod softwares;
pub mod user_profiles;
pub mod user_settings;
pub mod users;

/// Generates the entity module of a device attribute catalog
/// (`title/description/code_name/status/is_core/is_deprecated/...`).
macro_rules! device_catalog_entity {
    ($(#[$doc:meta])* $module:ident, $table:tt) => {
        $(#[$doc])*
        pub mod $module {
            use sea_orm::entity::prelude::*;
            use serde::{Deserialize, Serialize};

            #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
            #[sea_orm(table_name = $table)]
            pub struct Model {
                #[sea_orm(primary_key)]
                pub id: i32,
                pub title: String,
                #[sea_orm(column_type = "Text", nullable)]
                pub description: Option<String>,
                pub code_name: Option<String>,
                pub status: i32,
                pub is_core: bool,
                pub is_deprecated: bool,
                pub sort_order: Option<i32>,
                pub creator_id: i32,
                pub updater_id: Option<i32>,
                pub created_at: DateTimeUtc,
                pub updated_at: Option<DateTimeUtc>,
            }

            #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
            pub enum Relation {
                #[sea_orm(
                    belongs_to = "super::users::Entity",
                    from = "Column::CreatorId",
                    to = "super::users::Column::Id",
                    on_delete = "Cascade"
                )]
                Creator,
                #[sea_orm(
                    belongs_to = "super::users::Entity",
                    from = "Column::UpdaterId",
                    to = "super::users::Column::Id",
                    on_delete = "Cascade"
                )]
                Updater,
            }

            impl ActiveModelBehavior for ActiveModel {}
        }
    };
}

device_catalog_entity!(
    /// `SeaORM` Entity for api_device_types table
    device_types,
    "api_device_types"
);
device_catalog_entity!(
    /// `SeaORM` Entity for api_device_marks table
    device_marks,
    "api_device_marks"
);
device_catalog_entity!(
    /// `SeaORM` Entity for api_device_models table
    device_models,
    "api_device_models"
);
device_catalog_entity!(
    /// `SeaORM` Entity for api_device_systems table
    device_systems,
    "api_device_systems"
);
device_catalog_entity!(
    /// `SeaORM` Entity for api_device_builds table
    device_builds,
    "api_device_builds"
);
device_catalog_entity!(
    /// `SeaORM` Entity for api_device_processors table
    device_processors,
    "api_device_processors"
);
device_catalog_entity!(
    /// `SeaORM` Entity for api_device_rams table
    device_rams,
    "api_device_rams"
);
device_catalog_entity!(
    /// `SeaORM` Entity for api_device_disks table
    device_disks,
    "api_device_disks"
);

/// Read access to the `{id, title, description}` triple that other
/// resources embed when they reference a catalog row.
pub trait Titled {
    fn id(&self) -> i32;
    fn title(&self) -> &str;
    fn description(&self) -> Option<&str>;
}

/// Rows carrying `creator_id` / `updater_id` audit columns.
pub trait Audited {
    fn creator_id(&self) -> i32;
    fn updater_id(&self) -> Option<i32>;
}

macro_rules! impl_titled {
    ($($module:ident),* $(,)?) => {
        $(
            impl Titled for $module::Model {
                fn id(&self) -> i32 {
                    self.id
                }

                fn title(&self) -> &str {
                    &self.title
                }

                fn description(&self) -> Option<&str> {
                    self.description.as_deref()
                }
            }
        )*
    };
}

macro_rules! impl_audited {
    ($($module:ident),* $(,)?) => {
        $(
            impl Audited for $module::Model {
                fn creator_id(&self) -> i32 {
                    self.creator_id
                }

                fn updater_id(&self) -> Option<i32> {
                    self.updater_id
                }
            }
        )*
    };
}

impl_titled!(
    device_types,
    device_marks,
    device_models,
    device_systems,
    device_builds,
    device_processors,
    device_rams,
    device_disks,
    softwares,
    location_zones,
    locations,
    notification_types,
    notifications,
);

impl_audited!(
    device_types,
    device_marks,
    device_models,
    device_systems,
    device_builds,
    device_processors,
    device_rams,
    device_disks,
    softwares,
    location_zones,
    locations,
    notification_types,
    notifications,
    devices,
);
