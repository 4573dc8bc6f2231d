//! `SeaORM` Entity for api_device_softwares table
//!
//! Join table between devices and softwares. The (device_id, software_id)
//! pair is unique; the index is created by the migration.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_device_softwares")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub device_id: i32,
    pub software_id: i32,
    pub installed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::devices::Entity",
        from = "Column::DeviceId",
        to = "super::devices::Column::Id",
        on_delete = "Cascade"
    )]
    Devices,
    #[sea_orm(
        belongs_to = "super::softwares::Entity",
        from = "Column::SoftwareId",
        to = "super::softwares::Column::Id",
        on_delete = "Cascade"
    )]
    Softwares,
}

impl Related<super::devices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Devices.def()
    }
}

impl Related<super::softwares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Softwares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
