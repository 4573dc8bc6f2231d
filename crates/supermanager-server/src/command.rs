//! One-shot CLI subcommands

use sea_orm::DatabaseConnection;

use supermanager_auth::service::user::{self, UserForm};
use supermanager_migration::{Migrator, MigratorTrait};
use supermanager_persistence::entity::users;

/// Applies every pending schema migration.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    Migrator::up(db, None).await?;
    tracing::info!("Database schema is up to date");

    Ok(())
}

/// Creates an active staff superuser after the usual username/email checks.
pub async fn create_superuser(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<users::Model> {
    let form = UserForm {
        username: Some(username.to_string()),
        email: Some(email.to_string()),
        password: Some(password.to_string()),
        is_active: Some(true),
        is_staff: Some(true),
        is_superuser: Some(true),
        ..Default::default()
    };

    user::validate_form(db, &form, None, false).await?;
    let (created, _) = user::create(db, &form).await?;

    tracing::info!(user_id = created.id, username = %created.username, "Superuser created");

    Ok(created)
}
