// Software installed on devices. Writes only touch the (device, software) pair.

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};

use supermanager_inventory::DeviceSoftwareForm;
use supermanager_inventory::service::device_software;
use supermanager_server_common::model::response::page_request;
use supermanager_server_common::{AppError, AppState, Paginated, Secured, secured};

const RESOURCE: &str = "/device-softwares";

#[get("/device-softwares")]
async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(&req, &data, RESOURCE).build());

    let request = page_request(&params, data.page_size());
    let page = device_software::list(data.db(), &params, request).await?;

    Ok(Paginated::http_response(&req, page))
}

#[post("/device-softwares")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Json<DeviceSoftwareForm>,
) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(&req, &data, RESOURCE).build());

    let item = device_software::create(data.db(), &form).await?;

    Ok(HttpResponse::Created().json(item))
}

#[get("/device-softwares/{id}")]
async fn retrieve(
    req: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(&req, &data, RESOURCE).build());

    let item = device_software::get(data.db(), id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(item))
}

async fn write(
    req: &HttpRequest,
    data: &web::Data<AppState>,
    id: i32,
    form: &DeviceSoftwareForm,
) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(req, data, RESOURCE).build());

    let item = device_software::update(data.db(), id, form).await?;

    Ok(HttpResponse::Ok().json(item))
}

#[put("/device-softwares/{id}")]
async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<i32>,
    form: web::Json<DeviceSoftwareForm>,
) -> Result<HttpResponse, AppError> {
    write(&req, &data, id.into_inner(), &form).await
}

#[patch("/device-softwares/{id}")]
async fn partial_update(
    req: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<i32>,
    form: web::Json<DeviceSoftwareForm>,
) -> Result<HttpResponse, AppError> {
    write(&req, &data, id.into_inner(), &form).await
}

#[delete("/device-softwares/{id}")]
async fn destroy(
    req: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(&req, &data, RESOURCE).build());

    device_software::delete(data.db(), id.into_inner()).await?;

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
