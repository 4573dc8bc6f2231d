//! Application and user settings singletons

use std::time::Duration;

use moka::future::Cache;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;

use supermanager_persistence::entity::{app_settings, user_settings};

/// How long a singleton is served from memory
pub const SETTINGS_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Serves the settings singletons, creating each with its defaults on first read.
#[derive(Clone)]
pub struct SettingsService {
    app_cache: Cache<i32, app_settings::Model>,
    user_cache: Cache<i32, user_settings::Model>,
}

impl Default for SettingsService {
    fn default() -> Self {
        Self::new(SETTINGS_CACHE_TTL)
    }
}

impl SettingsService {
    pub fn new(ttl: Duration) -> Self {
        Self {
            app_cache: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
            user_cache: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
        }
    }

    pub async fn app_settings(&self, db: &DatabaseConnection) -> anyhow::Result<app_settings::Model> {
        if let Some(settings) = self.app_cache.get(&app_settings::SINGLETON_ID).await {
            return Ok(settings);
        }

        let settings = load_app_settings(db).await?;
        self.app_cache
            .insert(app_settings::SINGLETON_ID, settings.clone())
            .await;

        Ok(settings)
    }

    pub async fn user_settings(&self, db: &DatabaseConnection) -> anyhow::Result<user_settings::Model> {
        if let Some(settings) = self.user_cache.get(&user_settings::SINGLETON_ID).await {
            return Ok(settings);
        }

        let settings = load_user_settings(db).await?;
        self.user_cache
            .insert(user_settings::SINGLETON_ID, settings.clone())
            .await;

        Ok(settings)
    }

    pub fn invalidate(&self) {
        self.app_cache.invalidate_all();
        self.user_cache.invalidate_all();
    }
}

pub async fn load_app_settings(db: &DatabaseConnection) -> anyhow::Result<app_settings::Model> {
    if let Some(settings) = app_settings::Entity::find_by_id(app_settings::SINGLETON_ID)
        .one(db)
        .await?
    {
        return Ok(settings);
    }

    create_default_app_settings(db).await
}

/// Inserts the default row unless another caller already did, then reads it back.
pub async fn create_default_app_settings(db: &DatabaseConnection) -> anyhow::Result<app_settings::Model> {
    let inserted = app_settings::Entity::insert(
        app_settings::Model::default().into_active_model().reset_all(),
    )
    .on_conflict(
        OnConflict::column(app_settings::Column::Id)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    if inserted > 0 {
        info!("Created default application settings");
    }

    app_settings::Entity::find_by_id(app_settings::SINGLETON_ID)
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("application settings row is missing"))
}

pub async fn load_user_settings(db: &DatabaseConnection) -> anyhow::Result<user_settings::Model> {
    if let Some(settings) = user_settings::Entity::find_by_id(user_settings::SINGLETON_ID)
        .one(db)
        .await?
    {
        return Ok(settings);
    }

    create_default_user_settings(db).await
}

pub async fn create_default_user_settings(db: &DatabaseConnection) -> anyhow::Result<user_settings::Model> {
    let inserted = user_settings::Entity::insert(
        user_settings::Model::default().into_active_model().reset_all(),
    )
    .on_conflict(
        OnConflict::column(user_settings::Column::Id)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    if inserted > 0 {
        info!("Created default user settings");
    }

    user_settings::Entity::find_by_id(user_settings::SINGLETON_ID)
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user settings row is missing"))
}
