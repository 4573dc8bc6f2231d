use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, get, web};

use supermanager_inventory::service::location_zone;
use supermanager_server_common::model::response::page_request;
use supermanager_server_common::{AppError, AppState, Paginated};

/// Locations of one zone. Open to anonymous callers.
#[get("/location-zones/{id}/locations")]
async fn locations(
    req: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<i32>,
    params: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let request = page_request(&params, data.page_size());
    let page = location_zone::locations(data.db(), id.into_inner(), request).await?;

    Ok(Paginated::http_response(&req, page))
}
