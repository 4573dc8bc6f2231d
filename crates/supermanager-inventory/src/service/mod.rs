//! Inventory services
//!
//! Every resource module exposes the same shape: `list`, `get`, `create`,
//! `update` and `delete`, returning rendered items. Helpers shared by those
//! modules live here.

use std::collections::HashMap;

use sea_orm::*;

use supermanager_auth::UserInfo;
use supermanager_auth::service::user;
use supermanager_common::{FieldErrors, SuperManagerError};
use supermanager_persistence::entity::users;
use supermanager_persistence::query::{FilterField, filter_condition, resolve_ordering};
use supermanager_persistence::{Audited, Titled, parse_ordering};

use crate::model::Brief;

/// Copies the present [`BaseForm`](crate::model::BaseForm) keys onto an active model.
macro_rules! apply_base_form {
    ($active:ident, $form:expr, without_code_name) => {{
        let form = $form;
        if let Some(v) = &form.title {
            $active.title = Set(v.clone());
        }
        if let Some(v) = &form.description {
            $active.description = Set(v.clone());
        }
        if let Some(v) = form.status {
            $active.status = Set(v);
        }
        if let Some(v) = form.sort_order {
            $active.sort_order = Set(v);
        }
    }};
    ($active:ident, $form:expr) => {{
        let form = $form;
        if let Some(v) = &form.code_name {
            $active.code_name = Set(v.clone());
        }
        apply_base_form!($active, form, without_code_name);
    }};
}

pub mod catalog;
pub mod device;
pub mod device_software;
pub mod location;
pub mod location_zone;
pub mod notification;
pub mod notification_type;
pub mod settings;
pub mod software;

/// Rejects writes to a core row unless `actor` is a superuser.
pub fn guard_core(is_core: bool, actor: &users::Model, resource: &str) -> Result<(), SuperManagerError> {
    if is_core && !actor.is_superuser {
        return Err(SuperManagerError::CoreRecordProtected(resource.to_string()));
    }
    Ok(())
}

pub fn invalid_pk_message(id: i32) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

/// Records an error on `field` when `id` is given but no `E` row has it.
pub async fn check_reference<E>(
    db: &DatabaseConnection,
    errors: &mut FieldErrors,
    field: &str,
    id: Option<i32>,
) -> anyhow::Result<()>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    if let Some(id) = id
        && E::find_by_id(id).one(db).await?.is_none()
    {
        errors.add(field, invalid_pk_message(id));
    }
    Ok(())
}

/// `{id, title, description}` of the `E` rows whose `column` is in `ids`
pub async fn load_briefs<E>(
    db: &DatabaseConnection,
    column: E::Column,
    ids: &[i32],
) -> anyhow::Result<HashMap<i32, Brief>>
where
    E: EntityTrait,
    E::Model: Titled,
{
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = E::find().filter(column.is_in(ids)).all(db).await?;

    Ok(rows.iter().map(|r| (r.id(), Brief::from(r))).collect())
}

/// Creator and updater objects for a batch of rows
pub async fn audit_users<M: Audited>(
    db: &DatabaseConnection,
    rows: &[M],
) -> anyhow::Result<HashMap<i32, UserInfo>> {
    let ids = rows
        .iter()
        .flat_map(|r| std::iter::once(r.creator_id()).chain(r.updater_id()))
        .collect::<Vec<i32>>();

    user::load_user_infos(db, &ids).await
}

pub(crate) fn lookup_user(users: &HashMap<i32, UserInfo>, id: Option<i32>) -> Option<UserInfo> {
    id.and_then(|id| users.get(&id).cloned())
}

/// Parses the filter parameters and `ordering` of a list request.
pub fn list_query<C: ColumnTrait>(
    params: &HashMap<String, String>,
    fields: &[FilterField<C>],
    tiebreak: C,
) -> Result<(Condition, Vec<(C, Order)>), SuperManagerError> {
    let condition = filter_condition(params, fields)?;
    let ordering = resolve_ordering(
        &parse_ordering(params.get("ordering").map(String::as_str).unwrap_or_default()),
        fields,
        tiebreak,
    );

    Ok((condition, ordering))
}

pub(crate) fn not_found() -> anyhow::Error {
    SuperManagerError::NotFound.into()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn actor(is_superuser: bool) -> users::Model {
        users::Model {
            id: 1,
            password: String::new(),
            last_login: None,
            is_superuser,
            username: "actor".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: "actor@example.com".to_string(),
            is_staff: true,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_guard_core() {
        assert!(guard_core(false, &actor(false), "device types").is_ok());
        assert!(guard_core(true, &actor(true), "device types").is_ok());

        let err = guard_core(true, &actor(false), "device types").unwrap_err();
        assert_eq!(err.to_string(), "Only superadmins can edit core device types.");
    }

    #[test]
    fn test_invalid_pk_message() {
        assert_eq!(
            invalid_pk_message(42),
            "Invalid pk \"42\" - object does not exist."
        );
    }
}
