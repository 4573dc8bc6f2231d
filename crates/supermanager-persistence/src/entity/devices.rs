//! `SeaORM` Entity for api_devices table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_devices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub internal_id: String,
    pub status: i32,
    pub location_id: i32,
    pub type_id: i32,
    pub mark_id: i32,
    pub model_id: i32,
    pub hostname: Option<String>,
    pub system_id: i32,
    pub build_id: i32,
    pub processor_id: i32,
    pub ram_id: i32,
    pub disk_id: i32,
    pub disk_internal_id: Option<String>,
    pub disk_serial: Option<String>,
    pub network_ipv4: Option<String>,
    pub network_ipv6: Option<String>,
    pub network_mac: Option<String>,
    pub remote_id: Option<String>,
    pub serial: Option<String>,
    pub sector: Option<String>,
    pub user_owner: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub sort_order: Option<i32>,
    pub creator_id: i32,
    pub updater_id: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::LocationId",
        to = "super::locations::Column::Id",
        on_delete = "Cascade"
    )]
    Locations,
    #[sea_orm(
        belongs_to = "super::device_types::Entity",
        from = "Column::TypeId",
        to = "super::device_types::Column::Id",
        on_delete = "Cascade"
    )]
    DeviceTypes,
    #[sea_orm(
        belongs_to = "super::device_marks::Entity",
        from = "Column::MarkId",
        to = "super::device_marks::Column::Id",
        on_delete = "Cascade"
    )]
    DeviceMarks,
    #[sea_orm(
        belongs_to = "super::device_models::Entity",
        from = "Column::ModelId",
        to = "super::device_models::Column::Id",
        on_delete = "Cascade"
    )]
    DeviceModels,
    #[sea_orm(
        belongs_to = "super::device_systems::Entity",
        from = "Column::SystemId",
        to = "super::device_systems::Column::Id",
        on_delete = "Cascade"
    )]
    DeviceSystems,
    #[sea_orm(
        belongs_to = "super::device_builds::Entity",
        from = "Column::BuildId",
        to = "super::device_builds::Column::Id",
        on_delete = "Cascade"
    )]
    DeviceBuilds,
    #[sea_orm(
        belongs_to = "super::device_processors::Entity",
        from = "Column::ProcessorId",
        to = "super::device_processors::Column::Id",
        on_delete = "Cascade"
    )]
    DeviceProcessors,
    #[sea_orm(
        belongs_to = "super::device_rams::Entity",
        from = "Column::RamId",
        to = "super::device_rams::Column::Id",
        on_delete = "Cascade"
    )]
    DeviceRams,
    #[sea_orm(
        belongs_to = "super::device_disks::Entity",
        from = "Column::DiskId",
        to = "super::device_disks::Column::Id",
        on_delete = "Cascade"
    )]
    DeviceDisks,
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
    #[sea_orm(has_many = "super::device_softwares::Entity")]
    DeviceSoftwares,
}

impl Related<super::locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl Related<super::device_softwares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceSoftwares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
