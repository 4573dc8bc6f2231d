//! `SeaORM` Entity for api_notifications table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: i32,
    pub type_id: i32,
    pub module: String,
    pub module_id: i32,
    pub sort_order: Option<i32>,
    pub creator_id: i32,
    pub updater_id: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::notification_types::Entity",
        from = "Column::TypeId",
        to = "super::notification_types::Column::Id",
        on_delete = "Cascade"
    )]
    NotificationTypes,
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

impl Related<super::notification_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NotificationTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
