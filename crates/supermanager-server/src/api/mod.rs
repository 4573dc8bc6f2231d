// HTTP API handlers
// Every route is declared without a trailing slash; NormalizePath trims it from requests.

pub mod auth; // Register, login, tokens and passwords
pub mod device_software; // Device/software installations
pub mod health; // Database liveness probe
pub mod location_zone; // Locations of a zone
pub mod profile; // The caller's own account and avatar
pub mod resource; // Catalogs, locations, devices, notifications
pub mod settings; // App and user settings singletons
pub mod user; // User administration

use actix_web::web;

/// Mounts every API route at the root path.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(auth::routes())
        .service(location_zone::locations)
        .configure(resource::configure)
        .configure(device_software::configure)
        .configure(user::configure)
        .configure(profile::configure)
        .configure(settings::configure);
}
