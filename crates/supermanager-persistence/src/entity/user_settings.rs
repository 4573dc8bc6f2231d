//! `SeaORM` Entity for api_user_settings table
//!
//! Singleton row, always stored with `id = 1`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const SINGLETON_ID: i32 = 1;

pub const LANGUAGES: &[&str] = &["en", "es"];
pub const THEMES: &[&str] = &["light", "dark"];
pub const DATE_FORMATS: &[&str] = &["numeric", "2-digit"];

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_user_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip)]
    pub id: i32,
    pub default_language: String,
    pub default_theme: String,
    pub date_format_day: String,
    pub date_format_month: String,
    pub date_format_year: String,
    pub timezone: String,
    pub time_24h: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            id: SINGLETON_ID,
            default_language: "en".to_string(),
            default_theme: "light".to_string(),
            date_format_day: "2-digit".to_string(),
            date_format_month: "2-digit".to_string(),
            date_format_year: "numeric".to_string(),
            timezone: "America/New_York".to_string(),
            time_24h: true,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
