use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;

use supermanager_server_common::AppState;

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    database: &'static str,
}

/// GET /health
///
/// Liveness probe. Reports 503 when the database does not answer a ping.
#[get("/health")]
async fn health(data: web::Data<AppState>) -> impl Responder {
    match data.db().ping().await {
        Ok(()) => HttpResponse::Ok().json(HealthStatus {
            status: "UP",
            database: "UP",
        }),
        Err(e) => {
            tracing::error!("Database ping failed: {}", e);
            HttpResponse::ServiceUnavailable().json(HealthStatus {
                status: "DOWN",
                database: "DOWN",
            })
        }
    }
}
