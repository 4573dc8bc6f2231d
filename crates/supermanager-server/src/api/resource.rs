//! Inventory resources that share the list / create / retrieve / update /
//! partial update / destroy contract.
//!
//! Each module registers `{path}` and `{path}/{id}`; trailing slashes are
//! trimmed by `NormalizePath` before routing.

/// Generates the handlers and `configure` function of one resource.
///
/// `guarded` resources pass the current user to `delete` so the core-record
/// rule applies; `plain` resources delete by id only.
macro_rules! resource_api {
    (@delete guarded, $db:expr, $current:expr, $id:expr) => {
        service::delete($db, $current, $id)
    };
    (@delete plain, $db:expr, $current:expr, $id:expr) => {{
        let _ = $current;
        service::delete($db, $id)
    }};
    ($(#[$doc:meta])* $module:ident, $path:literal, $($service:ident)::+, $form:ty, $delete:ident) => {
        $(#[$doc])*
        pub mod $module {
            use std::collections::HashMap;

            use actix_web::{HttpRequest, HttpResponse, web};

            use supermanager_server_common::model::response::page_request;
            use supermanager_server_common::{AppError, AppState, Paginated, Secured, secured};

            use $($service)::+ as service;

            const RESOURCE: &str = $path;

            async fn list(
                req: HttpRequest,
                data: web::Data<AppState>,
                params: web::Query<HashMap<String, String>>,
            ) -> Result<HttpResponse, AppError> {
                secured!(Secured::builder(&req, &data, RESOURCE).build());

                let request = page_request(&params, data.page_size());
                let page = service::list(data.db(), &params, request).await?;

                Ok(Paginated::http_response(&req, page))
            }

            async fn create(
                req: HttpRequest,
                data: web::Data<AppState>,
                form: web::Json<$form>,
            ) -> Result<HttpResponse, AppError> {
                let current = secured!(Secured::builder(&req, &data, RESOURCE).build());

                let item = service::create(data.db(), &current, &form).await?;

                Ok(HttpResponse::Created().json(item))
            }

            async fn retrieve(
                req: HttpRequest,
                data: web::Data<AppState>,
                id: web::Path<i32>,
            ) -> Result<HttpResponse, AppError> {
                secured!(Secured::builder(&req, &data, RESOURCE).build());

                let item = service::get(data.db(), id.into_inner()).await?;

                Ok(HttpResponse::Ok().json(item))
            }

            async fn write(
                req: HttpRequest,
                data: web::Data<AppState>,
                id: i32,
                form: &$form,
                partial: bool,
            ) -> Result<HttpResponse, AppError> {
                let current = secured!(Secured::builder(&req, &data, RESOURCE).build());

                let item = service::update(data.db(), &current, id, form, partial).await?;

                Ok(HttpResponse::Ok().json(item))
            }

            async fn update(
                req: HttpRequest,
                data: web::Data<AppState>,
                id: web::Path<i32>,
                form: web::Json<$form>,
            ) -> Result<HttpResponse, AppError> {
                write(req, data, id.into_inner(), &form, false).await
            }

            async fn partial_update(
                req: HttpRequest,
                data: web::Data<AppState>,
                id: web::Path<i32>,
                form: web::Json<$form>,
            ) -> Result<HttpResponse, AppError> {
                write(req, data, id.into_inner(), &form, true).await
            }

            async fn destroy(
                req: HttpRequest,
                data: web::Data<AppState>,
                id: web::Path<i32>,
            ) -> Result<HttpResponse, AppError> {
                let current = secured!(Secured::builder(&req, &data, RESOURCE).build());

                resource_api!(@delete $delete, data.db(), &current, id.into_inner()).await?;

                Ok(HttpResponse::NoContent().finish())
            }

            pub fn configure(cfg: &mut web::ServiceConfig) {
                cfg.service(
                    web::resource($path)
                        .route(web::get().to(list))
                        .route(web::post().to(create)),
                )
                .service(
                    web::resource(concat!($path, "/{id}"))
                        .route(web::get().to(retrieve))
                        .route(web::put().to(update))
                        .route(web::patch().to(partial_update))
                        .route(web::delete().to(destroy)),
                );
            }
        }
    };
}

resource_api!(device_types, "/device-types", supermanager_inventory::service::catalog::device_types, supermanager_inventory::CatalogForm, guarded);
resource_api!(device_marks, "/device-marks", supermanager_inventory::service::catalog::device_marks, supermanager_inventory::CatalogForm, guarded);
resource_api!(device_models, "/device-models", supermanager_inventory::service::catalog::device_models, supermanager_inventory::CatalogForm, guarded);
resource_api!(device_systems, "/device-systems", supermanager_inventory::service::catalog::device_systems, supermanager_inventory::CatalogForm, guarded);
resource_api!(device_builds, "/device-builds", supermanager_inventory::service::catalog::device_builds, supermanager_inventory::CatalogForm, guarded);
resource_api!(device_processors, "/device-processors", supermanager_inventory::service::catalog::device_processors, supermanager_inventory::CatalogForm, guarded);
resource_api!(device_rams, "/device-rams", supermanager_inventory::service::catalog::device_rams, supermanager_inventory::CatalogForm, guarded);
resource_api!(device_disks, "/device-disks", supermanager_inventory::service::catalog::device_disks, supermanager_inventory::CatalogForm, guarded);

resource_api!(
    /// Software catalog, with `version`
    softwares,
    "/softwares",
    supermanager_inventory::service::software,
    supermanager_inventory::SoftwareForm,
    guarded
);

resource_api!(
    /// Location zones; the zone's locations are served by `location_zone`
    location_zones,
    "/location-zones",
    supermanager_inventory::service::location_zone,
    supermanager_inventory::LocationZoneForm,
    guarded
);

resource_api!(
    locations,
    "/locations",
    supermanager_inventory::service::location,
    supermanager_inventory::LocationForm,
    guarded
);

resource_api!(
    notification_types,
    "/notification-types",
    supermanager_inventory::service::notification_type,
    supermanager_inventory::BaseForm,
    guarded
);

resource_api!(
    /// Devices carry no core flag
    devices,
    "/devices",
    supermanager_inventory::service::device,
    supermanager_inventory::DeviceForm,
    plain
);

resource_api!(
    notifications,
    "/notifications",
    supermanager_inventory::service::notification,
    supermanager_inventory::NotificationForm,
    plain
);

/// Registers every generated resource.
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.configure(device_types::configure)
        .configure(device_marks::configure)
        .configure(device_models::configure)
        .configure(device_systems::configure)
        .configure(device_builds::configure)
        .configure(device_processors::configure)
        .configure(device_rams::configure)
        .configure(device_disks::configure)
        .configure(softwares::configure)
        .configure(location_zones::configure)
        .configure(locations::configure)
        .configure(notification_types::configure)
        .configure(devices::configure)
        .configure(notifications::configure);
}
