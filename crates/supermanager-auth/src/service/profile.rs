//! User profile service

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::*;
use serde::Deserialize;
use validator::Validate;

use supermanager_common::FieldErrors;
use supermanager_common::validation::deserialize_some;
use supermanager_persistence::entity::user_profiles;

/// Writable profile columns. Absent keys leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(max = 15))]
    pub phone: Option<String>,
    #[validate(length(max = 15))]
    pub mobile: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub city: Option<String>,
    #[validate(length(max = 200))]
    pub state: Option<String>,
    #[validate(length(max = 12))]
    pub zip_code: Option<String>,
    #[validate(length(max = 200))]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub birth: Option<Option<NaiveDate>>,
    #[validate(length(max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 250))]
    pub about: Option<String>,
}

impl ProfileForm {
    pub fn errors(&self) -> FieldErrors {
        match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(&e),
        }
    }

    pub fn apply(&self, profile: &mut user_profiles::ActiveModel) {
        let text = |value: &Option<String>, column: &mut ActiveValue<Option<String>>| {
            if let Some(v) = value {
                *column = Set(Some(v.clone()));
            }
        };

        text(&self.phone, &mut profile.phone);
        text(&self.mobile, &mut profile.mobile);
        text(&self.address, &mut profile.address);
        text(&self.city, &mut profile.city);
        text(&self.state, &mut profile.state);
        text(&self.zip_code, &mut profile.zip_code);
        text(&self.country, &mut profile.country);
        text(&self.title, &mut profile.title);
        text(&self.about, &mut profile.about);

        if let Some(birth) = self.birth {
            profile.birth = Set(birth);
        }
    }
}

pub async fn find_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> anyhow::Result<Option<user_profiles::Model>> {
    let profile = user_profiles::Entity::find()
        .filter(user_profiles::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    Ok(profile)
}

/// Profiles of the given users keyed by user id
pub async fn find_by_users<C: ConnectionTrait>(
    db: &C,
    user_ids: &[i32],
) -> anyhow::Result<HashMap<i32, user_profiles::Model>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let profiles = user_profiles::Entity::find()
        .filter(user_profiles::Column::UserId.is_in(user_ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.user_id, p))
        .collect();

    Ok(profiles)
}

/// Writes `form` into the user's profile, creating the row when missing.
pub async fn save<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    form: &ProfileForm,
) -> anyhow::Result<user_profiles::Model> {
    let existing = find_by_user(db, user_id).await?;
    let mut profile = match &existing {
        Some(existing) => existing.clone().into_active_model(),
        None => user_profiles::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        },
    };

    form.apply(&mut profile);

    if let Some(existing) = existing
        && !profile.is_changed()
    {
        return Ok(existing);
    }

    let saved = profile.save(db).await?.try_into_model()?;

    Ok(saved)
}

pub async fn set_avatar(
    db: &DatabaseConnection,
    user_id: i32,
    avatar: &str,
) -> anyhow::Result<user_profiles::Model> {
    let mut profile = match find_by_user(db, user_id).await? {
        Some(existing) => existing.into_active_model(),
        None => user_profiles::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        },
    };

    profile.avatar = Set(Some(avatar.to_string()));

    let saved = profile.save(db).await?.try_into_model()?;

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_form_lengths() {
        let form = ProfileForm {
            phone: Some("1".repeat(16)),
            zip_code: Some("123456789012".to_string()),
            ..Default::default()
        };

        let errors = form.errors();
        assert!(errors.contains("phone"));
        assert!(!errors.contains("zip_code"));
    }

    #[test]
    fn test_profile_form_birth_null_vs_absent() {
        let absent: ProfileForm = serde_json::from_str(r#"{"city":"Lima"}"#).unwrap();
        assert_eq!(absent.birth, None);

        let null: ProfileForm = serde_json::from_str(r#"{"birth":null}"#).unwrap();
        assert_eq!(null.birth, Some(None));

        let set: ProfileForm = serde_json::from_str(r#"{"birth":"1990-05-17"}"#).unwrap();
        assert_eq!(set.birth, Some(NaiveDate::from_ymd_opt(1990, 5, 17)));
    }

    #[test]
    fn test_apply_only_touches_present_fields() {
        let form = ProfileForm {
            city: Some("Quito".to_string()),
            ..Default::default()
        };
        let mut active = <user_profiles::ActiveModel as Default>::default();
        form.apply(&mut active);

        assert_eq!(active.city, Set(Some("Quito".to_string())));
        assert!(active.phone.is_not_set());
        assert!(active.birth.is_not_set());
    }
}
