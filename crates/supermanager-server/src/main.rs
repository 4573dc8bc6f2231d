//! Main entry point for the SuperManager inventory server.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use supermanager_server::{
    command,
    startup::{self, LoggingConfig},
};
use supermanager_server_common::model::{Cli, Command};
use supermanager_server_common::{AppState, Configuration};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let configuration = Configuration::new(&cli)?;

    let _logging_guard = startup::init_logging(&LoggingConfig::from_configuration(&configuration))?;

    info!(
        environment = %configuration.environment(),
        "Connecting to database"
    );
    let database_connection = configuration.database_connection().await?;

    match cli.command {
        Some(Command::Migrate) => command::migrate(&database_connection).await?,
        Some(Command::CreateSuperuser {
            username,
            email,
            password,
        }) => {
            command::create_superuser(&database_connection, &username, &email, &password).await?;
        }
        Some(Command::Serve) | None => {
            let app_state = Arc::new(AppState::new(configuration, database_connection)?);

            command::migrate(app_state.db()).await?;
            startup::main_server(app_state)?.await?;

            info!("Server stopped");
        }
    }

    Ok(())
}
