//! `SeaORM` Entity for api_app_settings table
//!
//! Singleton row, always stored with `id = 1`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_app_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip)]
    pub id: i32,
    pub number_of_alerts: i32,
    pub items_title_min_length: i32,
    pub items_title_max_length: i32,
    pub items_title_code_name_length: i32,
    pub items_code_name_max_length: i32,
    pub username_min_length: i32,
    pub username_max_length: i32,
    pub password_min_length: i32,
    pub password_max_length: i32,
    pub email_min_length: i32,
    pub email_max_length: i32,
    pub name_min_length: i32,
    pub name_max_length: i32,
    pub default_page_size: i32,
    pub default_page_size_options: String,
    pub search_min_input_length: i32,
    pub search_max_input_length: i32,
    pub default_ordering_column: String,
    pub show_deprecated_only_in: String,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            id: SINGLETON_ID,
            number_of_alerts: 5,
            items_title_min_length: 3,
            items_title_max_length: 100,
            items_title_code_name_length: 50,
            items_code_name_max_length: 50,
            username_min_length: 3,
            username_max_length: 50,
            password_min_length: 8,
            password_max_length: 128,
            email_min_length: 5,
            email_max_length: 254,
            name_min_length: 2,
            name_max_length: 100,
            default_page_size: 20,
            default_page_size_options: "10,20,30,40,50,100".to_string(),
            search_min_input_length: 2,
            search_max_input_length: 100,
            default_ordering_column: "created_at".to_string(),
            show_deprecated_only_in: "models,systems,builds,processors,rams,disks,softwares"
                .to_string(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
