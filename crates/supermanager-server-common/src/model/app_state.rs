//! Application state management
//!
//! This module defines the central application state shared across all handlers.

use sea_orm::DatabaseConnection;

use supermanager_auth::model::{PasswordResetConfig, TokenConfig};
use supermanager_auth::service::mail::MailService;
use supermanager_inventory::SettingsService;

use super::config::Configuration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub configuration: Configuration,
    pub database_connection: DatabaseConnection,
    pub settings_service: SettingsService,
    pub mail_service: MailService,
    pub token_config: TokenConfig,
    pub password_reset_config: PasswordResetConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("configuration", &self.configuration)
            .field("database_connection", &"<DatabaseConnection>")
            .field("settings_service", &"<SettingsService>")
            .field("mail_service", &self.mail_service)
            .field("token_config", &"<TokenConfig>")
            .field("password_reset_config", &"<PasswordResetConfig>")
            .finish()
    }
}

impl AppState {
    /// Derives every service setting from `configuration`.
    ///
    /// Fails when no signing secret is configured outside development.
    pub fn new(
        configuration: Configuration,
        database_connection: DatabaseConnection,
    ) -> anyhow::Result<Self> {
        let settings_service = SettingsService::new(configuration.settings_cache_ttl());
        let mail_service = MailService::new(configuration.mail_config());
        let token_config = configuration.token_config()?;
        let password_reset_config = configuration.password_reset_config()?;

        Ok(Self {
            configuration,
            database_connection,
            settings_service,
            mail_service,
            token_config,
            password_reset_config,
        })
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.database_connection
    }

    pub fn page_size(&self) -> u64 {
        self.configuration.pagination_page_size()
    }
}
