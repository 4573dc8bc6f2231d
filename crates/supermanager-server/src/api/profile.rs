//! `/profile`: the calling user's own account and profile

use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use futures::StreamExt;

use supermanager_auth::ExtendedUser;
use supermanager_auth::service::profile;
use supermanager_auth::service::user::{self, UserForm};
use supermanager_common::SuperManagerError;
use supermanager_persistence::entity::users;
use supermanager_server_common::model::AVATARS_DIR;
use supermanager_server_common::{AppError, AppState, Secured, secured};

const RESOURCE: &str = "/profile";
const AVATAR_FIELD: &str = "avatar";
const DEFAULT_AVATAR_NAME: &str = "avatar";

pub const CANNOT_DELETE_PROFILE: &str = "You cannot delete your profile.";
pub const NO_FILE_PROVIDED: &str = "No file provided.";
pub const FILE_TOO_LARGE: &str = "File too large.";

async fn extended(data: &AppState, current: &users::Model) -> anyhow::Result<ExtendedUser> {
    let extended = user::find_extended(data.db(), current.id)
        .await?
        .unwrap_or_else(|| ExtendedUser::new(current, None));

    Ok(extended)
}

#[get("/profile")]
async fn retrieve(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let current = secured!(Secured::builder(&req, &data, RESOURCE).build());

    Ok(HttpResponse::Ok().json(extended(&data, &current).await?))
}

async fn write(
    req: &HttpRequest,
    data: &web::Data<AppState>,
    form: &UserForm,
    partial: bool,
) -> Result<HttpResponse, AppError> {
    let current = secured!(Secured::builder(req, data, RESOURCE).build());

    // Account flags and the password have their own endpoints
    let form = UserForm {
        is_active: None,
        is_staff: None,
        is_superuser: None,
        password: None,
        ..form.clone()
    };

    user::validate_form(data.db(), &form, Some(current.id), partial).await?;
    let (updated, profile) = user::update(data.db(), current, &form).await?;

    Ok(HttpResponse::Ok().json(ExtendedUser::new(&updated, Some(&profile))))
}

#[put("/profile")]
async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Json<UserForm>,
) -> Result<HttpResponse, AppError> {
    write(&req, &data, &form, false).await
}

#[patch("/profile")]
async fn partial_update(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Json<UserForm>,
) -> Result<HttpResponse, AppError> {
    write(&req, &data, &form, true).await
}

#[delete("/profile")]
async fn destroy(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    secured!(Secured::builder(&req, &data, RESOURCE).build());

    Ok(HttpResponse::BadRequest().json([CANNOT_DELETE_PROFILE]))
}

/// Keeps the final path component and replaces anything outside `[A-Za-z0-9._-]`.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        DEFAULT_AVATAR_NAME.to_string()
    } else {
        cleaned
    }
}

/// `photo.png` -> `photo_<suffix>.png`
fn with_suffix(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", name, suffix),
    }
}

/// Writes the upload under `<media_root>/avatars`, never overwriting an
/// existing file, and returns the stored file name.
async fn store_avatar(media_root: &Path, file_name: &str, bytes: &[u8]) -> anyhow::Result<String> {
    let dir = media_root.join(AVATARS_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let mut name = sanitize_file_name(file_name);
    let mut path: PathBuf = dir.join(&name);
    while tokio::fs::try_exists(&path).await? {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        name = with_suffix(&sanitize_file_name(file_name), &suffix[..7]);
        path = dir.join(&name);
    }

    tokio::fs::write(&path, bytes).await?;

    Ok(name)
}

#[post("/profile/upload-avatar")]
async fn upload_avatar(
    req: HttpRequest,
    data: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let current = secured!(Secured::builder(&req, &data, RESOURCE).build());

    let max_bytes = data.configuration.max_avatar_bytes();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(Ok(mut field)) = payload.next().await {
        let (name, file_name) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(str::to_string),
                cd.get_filename().map(str::to_string),
            ),
            None => (None, None),
        };
        if name.as_deref() != Some(AVATAR_FIELD) {
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| SuperManagerError::IllegalArgument(e.to_string()))?;
            if bytes.len() + chunk.len() > max_bytes {
                tracing::warn!(user_id = current.id, max_bytes, "Avatar upload rejected");
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "error": FILE_TOO_LARGE })));
            }
            bytes.extend_from_slice(&chunk);
        }

        if !bytes.is_empty() {
            upload = Some((file_name.unwrap_or_else(|| DEFAULT_AVATAR_NAME.to_string()), bytes));
            break;
        }
    }

    let Some((file_name, bytes)) = upload else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "error": NO_FILE_PROVIDED })));
    };

    let media_root = PathBuf::from(data.configuration.media_root());
    let stored = store_avatar(&media_root, &file_name, &bytes).await?;
    let url = format!("{}{}/{}", data.configuration.media_url(), AVATARS_DIR, stored);

    profile::set_avatar(data.db(), current.id, &url).await?;
    tracing::info!(user_id = current.id, avatar = %url, "Avatar uploaded");

    Ok(HttpResponse::Ok().json(extended(&data, &current).await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_avatar)
        .service(retrieve)
        .service(update)
        .service(partial_update)
        .service(destroy);
}
