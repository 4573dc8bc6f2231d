// Shared fixtures for the HTTP integration tests
// Each test gets its own migrated in-memory SQLite database

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use config::Config;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;

use supermanager_auth::service::jwt;
use supermanager_auth::service::user::{self, UserForm};
use supermanager_migration::{Migrator, MigratorTrait};
use supermanager_persistence::entity::users;
use supermanager_server::middleware::allowed_hosts::HostPolicy;
use supermanager_server::startup;
use supermanager_server_common::{AppState, Configuration};

pub const PASSWORD: &str = "correct-horse-battery";

pub async fn state_with(overrides: &[(&str, &str)]) -> Arc<AppState> {
    let mut builder = Config::builder()
        .set_default("secret_key", "integration-test-secret")
        .unwrap();
    for (key, value) in overrides {
        builder = builder.set_override(*key, *value).unwrap();
    }
    let configuration = Configuration::from_config(builder.build().unwrap());

    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    Arc::new(AppState::new(configuration, db).unwrap())
}

pub async fn state() -> Arc<AppState> {
    state_with(&[]).await
}

/// The application exactly as `main_server` builds it
pub async fn init(
    state: &Arc<AppState>,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    let policy = HostPolicy::from_configuration(&state.configuration);
    test::init_service(startup::app(state.clone(), policy)).await
}

pub async fn create_user(state: &AppState, username: &str, staff: bool, superuser: bool) -> users::Model {
    let form = UserForm {
        username: Some(username.to_string()),
        email: Some(format!("{}@example.com", username)),
        first_name: Some(username.to_string()),
        is_active: Some(true),
        is_staff: Some(staff),
        is_superuser: Some(superuser),
        password: Some(PASSWORD.to_string()),
        ..Default::default()
    };

    user::create(state.db(), &form).await.unwrap().0
}

pub fn access_token(state: &AppState, user: &users::Model) -> String {
    jwt::encode_access_token(user.id, &state.token_config).unwrap().0
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Sends `req` and returns the status with the JSON body (`Null` when empty).
pub async fn send<S, B>(app: &S, req: TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let bytes = test::read_body(res).await;

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, body)
}
