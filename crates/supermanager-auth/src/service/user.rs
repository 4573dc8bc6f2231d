//! User service

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;
use serde::Deserialize;
use validator::Validate;

use supermanager_common::validation::{BLANK, INVALID_EMAIL, REQUIRED, is_valid_email};
use supermanager_common::{FieldErrors, SuperManagerError};
use supermanager_persistence::entity::{user_profiles, users};
use supermanager_persistence::query::{FilterField, FilterKind, fetch_page, filter_condition, resolve_ordering};
use supermanager_persistence::{Page, PageRequest, parse_ordering};

use crate::model::{
    BCRYPT_COST, EMAIL_TAKEN, ExtendedUser, UNUSABLE_PASSWORD_PREFIX, USERNAME_TAKEN, UserInfo,
};
use crate::service::profile::{self, ProfileForm};

const USER_FILTERS: &[FilterField<users::Column>] = &[
    FilterField::new("id", users::Column::Id, FilterKind::Integer),
    FilterField::new("username", users::Column::Username, FilterKind::Text),
    FilterField::new("email", users::Column::Email, FilterKind::Text),
    FilterField::new("first_name", users::Column::FirstName, FilterKind::Text),
    FilterField::new("last_name", users::Column::LastName, FilterKind::Text),
    FilterField::new("is_active", users::Column::IsActive, FilterKind::Boolean),
    FilterField::new("is_staff", users::Column::IsStaff, FilterKind::Boolean),
    FilterField::new("date_joined", users::Column::DateJoined, FilterKind::DateTime),
    FilterField::new("last_login", users::Column::LastLogin, FilterKind::DateTime),
];

const PROFILE_FILTERS: &[FilterField<user_profiles::Column>] = &[
    FilterField::new("profile__phone", user_profiles::Column::Phone, FilterKind::IContains),
    FilterField::new("profile__mobile", user_profiles::Column::Mobile, FilterKind::IContains),
    FilterField::new("profile__address", user_profiles::Column::Address, FilterKind::IContains),
    FilterField::new("profile__city", user_profiles::Column::City, FilterKind::IContains),
    FilterField::new("profile__state", user_profiles::Column::State, FilterKind::IContains),
    FilterField::new("profile__zip_code", user_profiles::Column::ZipCode, FilterKind::IContains),
    FilterField::new("profile__country", user_profiles::Column::Country, FilterKind::IContains),
    FilterField::new("profile__birth", user_profiles::Column::Birth, FilterKind::Date),
    FilterField::new("profile__title", user_profiles::Column::Title, FilterKind::IContains),
    FilterField::new("profile__about", user_profiles::Column::About, FilterKind::IContains),
];

/// Payload of `/users` and `/profile` writes
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserForm {
    #[validate(length(max = 150))]
    pub username: Option<String>,
    #[validate(length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileForm,
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    if hashed.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return false;
    }

    bcrypt::verify(password, hashed).unwrap_or(false)
}

fn unusable_password() -> String {
    format!(
        "{}{}",
        UNUSABLE_PASSWORD_PREFIX,
        uuid::Uuid::new_v4().simple()
    )
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> anyhow::Result<Option<users::Model>> {
    let user = users::Entity::find_by_id(id).one(db).await?;

    Ok(user)
}

pub async fn find_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> anyhow::Result<Option<users::Model>> {
    let user = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?;

    Ok(user)
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> anyhow::Result<Option<users::Model>> {
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .order_by_asc(users::Column::Id)
        .one(db)
        .await?;

    Ok(user)
}

pub async fn find_with_profile(
    db: &DatabaseConnection,
    id: i32,
) -> anyhow::Result<Option<(users::Model, Option<user_profiles::Model>)>> {
    let user = users::Entity::find_by_id(id)
        .find_also_related(user_profiles::Entity)
        .one(db)
        .await?;

    Ok(user)
}

pub async fn find_extended(db: &DatabaseConnection, id: i32) -> anyhow::Result<Option<ExtendedUser>> {
    let user = find_with_profile(db, id)
        .await?
        .map(|(user, profile)| ExtendedUser::new(&user, profile.as_ref()));

    Ok(user)
}

pub async fn username_exists(
    db: &DatabaseConnection,
    username: &str,
    exclude_id: Option<i32>,
) -> anyhow::Result<bool> {
    let mut select = users::Entity::find().filter(users::Column::Username.eq(username));
    if let Some(id) = exclude_id {
        select = select.filter(users::Column::Id.ne(id));
    }

    Ok(select.one(db).await?.is_some())
}

pub async fn email_exists(
    db: &DatabaseConnection,
    email: &str,
    exclude_id: Option<i32>,
) -> anyhow::Result<bool> {
    let mut select = users::Entity::find().filter(users::Column::Email.eq(email));
    if let Some(id) = exclude_id {
        select = select.filter(users::Column::Id.ne(id));
    }

    Ok(select.one(db).await?.is_some())
}

/// Checks a user form. `partial` skips the required-field checks, and
/// `instance` is excluded from the uniqueness checks.
pub async fn validate_form(
    db: &DatabaseConnection,
    form: &UserForm,
    instance: Option<i32>,
    partial: bool,
) -> anyhow::Result<()> {
    let mut errors = match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => FieldErrors::from(&e),
    };
    errors.merge(form.profile.errors());

    match form.username.as_deref() {
        None if !partial => errors.add("username", REQUIRED),
        Some(v) if v.trim().is_empty() => errors.add("username", BLANK),
        Some(v) => {
            if !errors.contains("username") && username_exists(db, v, instance).await? {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        None => {}
    }

    if let Some(email) = form.email.as_deref().filter(|v| !v.is_empty()) {
        if !is_valid_email(email) {
            errors.add("email", INVALID_EMAIL);
        } else if email_exists(db, email, instance).await? {
            errors.add("email", EMAIL_TAKEN);
        }
    }

    errors.into_result()?;

    Ok(())
}

/// Inserts a user together with its profile row.
pub async fn create(
    db: &DatabaseConnection,
    form: &UserForm,
) -> anyhow::Result<(users::Model, user_profiles::Model)> {
    let username = form
        .username
        .clone()
        .ok_or_else(|| SuperManagerError::field("username", REQUIRED))?;
    let password = match form.password.as_deref() {
        Some(p) => hash_password(p)?,
        None => unusable_password(),
    };

    let txn = db.begin().await?;

    let user = users::ActiveModel {
        password: Set(password),
        last_login: Set(None),
        is_superuser: Set(form.is_superuser.unwrap_or(false)),
        username: Set(username),
        first_name: Set(form.first_name.clone().unwrap_or_default()),
        last_name: Set(form.last_name.clone().unwrap_or_default()),
        email: Set(form.email.clone().unwrap_or_default()),
        is_staff: Set(form.is_staff.unwrap_or(false)),
        is_active: Set(form.is_active.unwrap_or(true)),
        date_joined: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let profile = profile::save(&txn, user.id, &form.profile).await?;

    txn.commit().await?;

    Ok((user, profile))
}

/// Applies the present fields of `form` to the user and its profile.
pub async fn update(
    db: &DatabaseConnection,
    user: users::Model,
    form: &UserForm,
) -> anyhow::Result<(users::Model, user_profiles::Model)> {
    let user_id = user.id;
    let mut active = user.clone().into_active_model();

    if let Some(v) = &form.username {
        active.username = Set(v.clone());
    }
    if let Some(v) = &form.email {
        active.email = Set(v.clone());
    }
    if let Some(v) = &form.first_name {
        active.first_name = Set(v.clone());
    }
    if let Some(v) = &form.last_name {
        active.last_name = Set(v.clone());
    }
    if let Some(v) = form.is_active {
        active.is_active = Set(v);
    }
    if let Some(v) = form.is_staff {
        active.is_staff = Set(v);
    }
    if let Some(v) = form.is_superuser {
        active.is_superuser = Set(v);
    }
    if let Some(p) = form.password.as_deref() {
        active.password = Set(hash_password(p)?);
    }

    let txn = db.begin().await?;

    let user = if active.is_changed() {
        active.update(&txn).await?
    } else {
        user
    };
    let profile = profile::save(&txn, user_id, &form.profile).await?;

    txn.commit().await?;

    Ok((user, profile))
}

pub async fn set_password(
    db: &DatabaseConnection,
    user: users::Model,
    password: &str,
) -> anyhow::Result<users::Model> {
    let mut active = user.into_active_model();
    active.password = Set(hash_password(password)?);

    let user = active.update(db).await?;

    Ok(user)
}

pub async fn touch_last_login(
    db: &DatabaseConnection,
    user: users::Model,
) -> anyhow::Result<users::Model> {
    let mut active = user.into_active_model();
    active.last_login = Set(Some(Utc::now()));

    let user = active.update(db).await?;

    Ok(user)
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> anyhow::Result<()> {
    let result = users::Entity::delete_by_id(id).exec(db).await?;

    if result.rows_affected == 0 {
        return Err(SuperManagerError::NotFound.into());
    }

    Ok(())
}

/// Filtered, ordered page of users. Recognised keys are the user columns,
/// the `profile__*` columns, `ordering`, `limit` and `offset`.
pub async fn search_page(
    db: &DatabaseConnection,
    params: &HashMap<String, String>,
    request: PageRequest,
) -> anyhow::Result<Page<ExtendedUser>> {
    let mut errors = FieldErrors::new();
    let mut condition = Condition::all();

    match filter_condition(params, USER_FILTERS) {
        Ok(c) => condition = condition.add(c),
        Err(e) => errors.merge(e),
    }
    match filter_condition(params, PROFILE_FILTERS) {
        Ok(c) => condition = condition.add(c),
        Err(e) => errors.merge(e),
    }
    errors.into_result()?;

    let select = users::Entity::find()
        .join(JoinType::LeftJoin, users::Relation::UserProfiles.def())
        .filter(condition);

    let ordering = resolve_ordering(
        &parse_ordering(params.get("ordering").map(String::as_str).unwrap_or_default()),
        USER_FILTERS,
        users::Column::Id,
    );

    let page = fetch_page(db, select, ordering, request).await?;

    let ids = page.results.iter().map(|u| u.id).collect::<Vec<i32>>();
    let profiles = profile::find_by_users(db, &ids).await?;

    Ok(page.map(|user| ExtendedUser::new(&user, profiles.get(&user.id))))
}

/// Public user objects for the given ids, used to embed `creator`/`updater`.
pub async fn load_user_infos(
    db: &DatabaseConnection,
    ids: &[i32],
) -> anyhow::Result<HashMap<i32, UserInfo>> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = users::Entity::find()
        .filter(users::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?;
    let profiles = profile::find_by_users(db, &ids).await?;

    Ok(users
        .iter()
        .map(|u| (u.id, UserInfo::new(u, profiles.get(&u.id))))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_verify() {
        let hashed = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hashed));
        assert!(!verify_password("wrong horse", &hashed));
    }

    #[test]
    fn test_unusable_password_never_verifies() {
        let marker = unusable_password();
        assert!(marker.starts_with(UNUSABLE_PASSWORD_PREFIX));
        assert!(!verify_password("", &marker));
        assert!(!verify_password(&marker, &marker));
    }

    #[test]
    fn test_user_form_flattens_profile() {
        let form: UserForm = serde_json::from_str(
            r#"{"username":"jdoe","is_staff":true,"city":"Lima","birth":null}"#,
        )
        .unwrap();

        assert_eq!(form.username.as_deref(), Some("jdoe"));
        assert_eq!(form.is_staff, Some(true));
        assert_eq!(form.profile.city.as_deref(), Some("Lima"));
        assert_eq!(form.profile.birth, Some(None));
    }

    #[test]
    fn test_user_form_password_length() {
        let form = UserForm {
            password: Some("short".to_string()),
            ..Default::default()
        };
        let errors = FieldErrors::from(&form.validate().unwrap_err());
        assert!(errors.contains("password"));
    }
}
