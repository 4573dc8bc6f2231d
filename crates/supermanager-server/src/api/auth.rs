//! `/auth/*` account endpoints
//!
//! Everything here is open to anonymous callers except the two
//! change-password endpoints.

use actix_web::{HttpRequest, HttpResponse, post, web};

use supermanager_auth::service::auth::{
    self, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RefreshRequest,
    RegisterRequest, ResetPasswordRequest, VerifyRequest,
};
use supermanager_server_common::{AppError, AppState, Secured, secured};

const RESOURCE: &str = "/auth";

#[post("/register")]
async fn register(
    data: web::Data<AppState>,
    form: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let user = auth::register(data.db(), &form).await?;

    Ok(HttpResponse::Created().json(user))
}

async fn obtain_pair(data: &AppState, form: &LoginRequest) -> Result<HttpResponse, AppError> {
    let pair = auth::login(data.db(), &data.token_config, form).await?;

    Ok(HttpResponse::Ok().json(pair))
}

#[post("/login")]
async fn login(
    data: web::Data<AppState>,
    form: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    obtain_pair(&data, &form).await
}

#[post("/token")]
async fn token(
    data: web::Data<AppState>,
    form: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    obtain_pair(&data, &form).await
}

#[post("/token/refresh")]
async fn token_refresh(
    data: web::Data<AppState>,
    form: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    let refreshed = auth::refresh(data.db(), &data.token_config, &form).await?;

    Ok(HttpResponse::Ok().json(refreshed))
}

#[post("/token/verify")]
async fn token_verify(
    data: web::Data<AppState>,
    form: web::Json<VerifyRequest>,
) -> Result<HttpResponse, AppError> {
    auth::verify(&data.token_config, &form)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({})))
}

#[post("/change-password")]
async fn change_password(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let current = secured!(
        Secured::builder(&req, &data, RESOURCE)
            .resource("/auth/change-password")
            .build()
    );

    let message = auth::change_password(data.db(), &current, &form).await?;

    Ok(HttpResponse::Ok().json(message))
}

#[post("/admin/change-password")]
async fn admin_change_password(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let current = secured!(
        Secured::builder(&req, &data, RESOURCE)
            .resource("/auth/admin/change-password")
            .staff()
            .build()
    );

    let message = auth::admin_change_password(data.db(), &form).await?;
    tracing::info!(target_user = ?form.id, by = current.id, "Password changed by admin");

    Ok(HttpResponse::Ok().json(message))
}

#[post("/forgot-password")]
async fn forgot_password(
    data: web::Data<AppState>,
    form: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let response = auth::forgot_password(
        data.db(),
        &data.password_reset_config,
        &data.mail_service,
        &form,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[post("/reset-password")]
async fn reset_password(
    data: web::Data<AppState>,
    form: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let message = auth::reset_password(data.db(), &data.password_reset_config, &form).await?;

    Ok(HttpResponse::Ok().json(message))
}

pub fn routes() -> actix_web::Scope {
    web::scope("/auth")
        .service(register)
        .service(login)
        .service(token)
        .service(token_refresh)
        .service(token_verify)
        .service(change_password)
        .service(admin_change_password)
        .service(forgot_password)
        .service(reset_password)
}
