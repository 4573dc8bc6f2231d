//! `SeaORM` Entity for api_locations table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub code_name: Option<String>,
    pub status: i32,
    pub is_core: bool,
    pub location_zone_id: i32,
    pub manager: String,
    pub manager_email: String,
    pub manager_phone: String,
    pub manager_mobile: String,
    pub collaborator: String,
    pub collaborator_email: String,
    pub collaborator_phone: String,
    pub collaborator_mobile: String,
    pub phone: String,
    pub mobile: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_order: Option<i32>,
    pub creator_id: i32,
    pub updater_id: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location_zones::Entity",
        from = "Column::LocationZoneId",
        to = "super::location_zones::Column::Id",
        on_delete = "Cascade"
    )]
    LocationZones,
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
    #[sea_orm(has_many = "super::devices::Entity")]
    Devices,
}

impl Related<super::location_zones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LocationZones.def()
    }
}

impl Related<super::devices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Devices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
