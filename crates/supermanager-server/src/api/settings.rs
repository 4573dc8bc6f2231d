use actix_web::{HttpRequest, HttpResponse, get, web};

use supermanager_server_common::{AppError, AppState, Secured, secured};

#[get("/app-settings")]
async fn app_settings(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(&req, &data, "/app-settings").build());

    let settings = data.settings_service.app_settings(data.db()).await?;

    Ok(HttpResponse::Ok().json(settings))
}

#[get("/user-settings")]
async fn user_settings(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(&req, &data, "/user-settings").build());

    let settings = data.settings_service.user_settings(data.db()).await?;

    Ok(HttpResponse::Ok().json(settings))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(app_settings).service(user_settings);
}
