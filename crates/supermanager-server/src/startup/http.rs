//! HTTP server setup.

use std::sync::Arc;

use actix_web::{
    App, Error, HttpRequest, HttpServer,
    body::MessageBody,
    dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse},
    error::{JsonPayloadError, PathError, QueryPayloadError},
    middleware::{Logger, NormalizePath, TrailingSlash},
    web,
};

use supermanager_common::SuperManagerError;
use supermanager_server_common::{AppError, AppState};

use crate::api;
use crate::middleware::{
    allowed_hosts::{AllowedHosts, HostPolicy},
    auth::Authentication,
};

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    let detail = match &err {
        JsonPayloadError::ContentType => {
            "Unsupported media type in request, expected application/json.".to_string()
        }
        e => format!("JSON parse error - {}", e),
    };
    AppError::from(SuperManagerError::IllegalArgument(detail)).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    AppError::from(SuperManagerError::IllegalArgument(err.to_string())).into()
}

// A non-numeric id never names a row
fn path_error_handler(_err: PathError, _req: &HttpRequest) -> Error {
    AppError::from(SuperManagerError::NotFound).into()
}

/// The full application: middleware, extractor error handlers and routes.
pub fn app(
    app_state: Arc<AppState>,
    policy: HostPolicy,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(Authentication)
        .wrap(AllowedHosts::new(policy))
        .wrap(NormalizePath::new(TrailingSlash::Trim))
        .wrap(Logger::default())
        .app_data(web::Data::from(app_state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .configure(api::routes)
}

/// Creates and binds the API server.
pub fn main_server(app_state: Arc<AppState>) -> Result<Server, std::io::Error> {
    let address = app_state.configuration.server_address();
    let port = app_state.configuration.server_port();
    let workers = app_state.configuration.server_workers();
    let policy = HostPolicy::from_configuration(&app_state.configuration);

    let mut server = HttpServer::new(move || app(app_state.clone(), policy.clone()));
    if let Some(workers) = workers {
        server = server.workers(workers);
    }

    tracing::info!(address = %address, port = port, "Starting HTTP server");

    Ok(server.bind((address, port))?.run())
}
