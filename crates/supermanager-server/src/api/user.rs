//! `/users` administration
//!
//! Staff manage every account; any authenticated user may read one.

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};

use supermanager_auth::ExtendedUser;
use supermanager_auth::service::user::{self, UserForm};
use supermanager_common::SuperManagerError;
use supermanager_server_common::model::response::page_request;
use supermanager_server_common::{AppError, AppState, Paginated, Secured, secured};

const RESOURCE: &str = "/users";

#[get("/users")]
async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(&req, &data, RESOURCE).staff().build());

    let request = page_request(&params, data.page_size());
    let page = user::search_page(data.db(), &params, request).await?;

    Ok(Paginated::http_response(&req, page))
}

#[post("/users")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Json<UserForm>,
) -> Result<HttpResponse, AppError> {
    let current = secured!(Secured::builder(&req, &data, RESOURCE).staff().build());

    user::validate_form(data.db(), &form, None, false).await?;
    let (created, profile) = user::create(data.db(), &form).await?;

    tracing::info!(user_id = created.id, by = current.id, "User created");

    Ok(HttpResponse::Created().json(ExtendedUser::new(&created, Some(&profile))))
}

#[get("/users/{id}")]
async fn retrieve(
    req: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(&req, &data, RESOURCE).build());

    let extended = user::find_extended(data.db(), id.into_inner())
        .await?
        .ok_or(SuperManagerError::NotFound)?;

    Ok(HttpResponse::Ok().json(extended))
}

async fn write(
    req: &HttpRequest,
    data: &web::Data<AppState>,
    id: i32,
    form: &UserForm,
    partial: bool,
) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(req, data, RESOURCE).staff().build());

    let existing = user::find_by_id(data.db(), id)
        .await?
        .ok_or(SuperManagerError::NotFound)?;

    user::validate_form(data.db(), form, Some(id), partial).await?;
    let (updated, profile) = user::update(data.db(), existing, form).await?;

    Ok(HttpResponse::Ok().json(ExtendedUser::new(&updated, Some(&profile))))
}

#[put("/users/{id}")]
async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<i32>,
    form: web::Json<UserForm>,
) -> Result<HttpResponse, AppError> {
    write(&req, &data, id.into_inner(), &form, false).await
}

#[patch("/users/{id}")]
async fn partial_update(
    req: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<i32>,
    form: web::Json<UserForm>,
) -> Result<HttpResponse, AppError> {
    write(&req, &data, id.into_inner(), &form, true).await
}

#[delete("/users/{id}")]
async fn destroy(
    req: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let current = secured!(Secured::builder(&req, &data, RESOURCE).staff().build());

    let id = id.into_inner();
    user::delete(data.db(), id).await?;

    tracing::info!(user_id = id, by = current.id, "User deleted");

    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create)
        .service(retrieve)
        .service(update)
        .service(partial_update)
        .service(destroy);
}
