//! Account flows: register, login, token lifecycle and password management

use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};
use validator::Validate;

use supermanager_common::validation::{BLANK, INVALID_EMAIL, REQUIRED, describe, is_valid_email};
use supermanager_common::{FieldErrors, SuperManagerError, is_development_environment};
use supermanager_persistence::entity::users;

use crate::model::*;
use crate::service::mail::MailService;
use crate::service::profile::{self, ProfileForm};
use crate::service::user::{self, UserForm};
use crate::service::{jwt, password_reset};

/// Accepts an id sent either as a JSON number or as a numeric string.
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    let raw = Option::<RawId>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawId::Int(v)) => i32::try_from(v)
            .map(Some)
            .map_err(|_| serde::de::Error::custom("A valid integer is required.")),
        Some(RawId::Str(v)) if v.trim().is_empty() => Ok(None),
        Some(RawId::Str(v)) => v
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom("A valid integer is required.")),
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 5, max = 20))]
    pub username: Option<String>,
    #[validate(email, length(min = 8, max = 120))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub repeat_password: Option<String>,
    #[validate(length(min = 4, max = 60))]
    pub first_name: Option<String>,
    #[validate(length(min = 4, max = 60))]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileForm,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyRequest {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<i32>,
    pub current_password: Option<String>,
    pub password: Option<String>,
    pub repeat_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    pub forgot_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordRequest {
    pub uid: Option<String>,
    pub token: Option<String>,
    pub password: Option<String>,
    pub repeat_password: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Required, non-blank checks for the named values
fn require(errors: &mut FieldErrors, fields: &[(&str, &Option<String>)]) {
    for (name, value) in fields {
        match value.as_deref() {
            None => errors.add(name, REQUIRED),
            Some(v) if v.trim().is_empty() => errors.add(name, BLANK),
            Some(_) => {}
        }
    }
}

fn check_new_password(
    errors: &mut FieldErrors,
    password: Option<&str>,
    repeat_password: Option<&str>,
) {
    for (name, value) in [("password", password), ("repeat_password", repeat_password)] {
        let len = value.map(|v| v.chars().count()).unwrap_or_default();
        if value.is_some() && !errors.contains(name) && !(8..=128).contains(&len) {
            let message = if len < 8 {
                supermanager_common::validation::min_length_message(8)
            } else {
                supermanager_common::validation::max_length_message(128)
            };
            errors.add(name, message);
        }
    }

    if errors.is_empty() && password != repeat_password {
        errors.add("password", PASSWORDS_DO_NOT_MATCH);
    }
}

/// Creates an inactive account with its profile.
pub async fn register(
    db: &DatabaseConnection,
    request: &RegisterRequest,
) -> anyhow::Result<ExtendedUser> {
    let mut errors = FieldErrors::new();
    require(
        &mut errors,
        &[
            ("username", &request.username),
            ("email", &request.email),
            ("password", &request.password),
            ("repeat_password", &request.repeat_password),
            ("first_name", &request.first_name),
            ("last_name", &request.last_name),
        ],
    );

    if let Err(e) = request.validate() {
        for (field, field_errors) in e.field_errors() {
            if errors.contains(field.as_ref()) {
                continue;
            }
            for error in field_errors {
                errors.add(field.as_ref(), describe(error));
            }
        }
    }
    errors.merge(request.profile.errors());
    errors.into_result()?;

    if request.password != request.repeat_password {
        return Err(SuperManagerError::field("password", PASSWORDS_DO_NOT_MATCH).into());
    }

    let username = request.username.clone().unwrap_or_default();
    let email = request.email.clone().unwrap_or_default();

    if user::username_exists(db, &username, None).await? {
        return Err(SuperManagerError::field("username", REGISTER_USERNAME_EXISTS).into());
    }
    if user::email_exists(db, &email, None).await? {
        return Err(SuperManagerError::field("email", REGISTER_EMAIL_EXISTS).into());
    }

    let form = UserForm {
        username: Some(username),
        email: Some(email),
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        is_active: Some(false),
        is_staff: Some(false),
        is_superuser: Some(false),
        password: request.password.clone(),
        profile: request.profile.clone(),
    };

    let (user, profile) = user::create(db, &form).await?;

    info!(user_id = user.id, username = %user.username, "Registered new user");

    Ok(ExtendedUser::new(&user, Some(&profile)))
}

/// Returns the user when the credentials are valid and the account is active.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> anyhow::Result<users::Model> {
    let user = user::find_by_username(db, username)
        .await?
        .filter(|u| user::verify_password(password, &u.password))
        .ok_or_else(|| SuperManagerError::AuthenticationFailed(INVALID_CREDENTIALS.to_string()))?;

    if !user.is_active {
        return Err(SuperManagerError::AuthenticationFailed(INACTIVE_USER.to_string()).into());
    }

    Ok(user)
}

/// Login and token obtain: verifies credentials and issues an access/refresh pair.
pub async fn login(
    db: &DatabaseConnection,
    config: &TokenConfig,
    request: &LoginRequest,
) -> anyhow::Result<TokenPair> {
    let (Some(username), Some(password)) = (present(&request.username), present(&request.password))
    else {
        let mut errors = FieldErrors::new();
        require(
            &mut errors,
            &[("username", &request.username), ("password", &request.password)],
        );
        return Err(SuperManagerError::Validation(errors).into());
    };

    let user = authenticate(db, username, password).await?;
    let user = user::touch_last_login(db, user).await?;
    let profile = profile::find_by_user(db, user.id).await?;

    let (access, claims) = jwt::encode_access_token(user.id, config)?;
    let (refresh, _) = jwt::encode_refresh_token(user.id, config)?;

    info!(user_id = user.id, "User logged in");

    Ok(TokenPair {
        access,
        refresh,
        user: UserInfo::new(&user, profile.as_ref()),
        exp: claims.exp,
    })
}

/// Exchanges a refresh token for a new access token.
pub async fn refresh(
    db: &DatabaseConnection,
    config: &TokenConfig,
    request: &RefreshRequest,
) -> anyhow::Result<RefreshedToken> {
    let token = present(&request.refresh)
        .ok_or_else(|| SuperManagerError::field("refresh", REQUIRED))?;

    let claims = jwt::decode_token(token, &config.signing_key).map_err(|e| {
        let ctx = AuthContext {
            jwt_error: Some(e),
            token_provided: true,
            ..Default::default()
        };
        SuperManagerError::TokenNotValid(ctx.jwt_error_string())
    })?;

    if !claims.is_refresh() {
        return Err(SuperManagerError::TokenNotValid(TOKEN_WRONG_TYPE.to_string()).into());
    }

    let (user, profile) = user::find_with_profile(db, claims.user_id)
        .await?
        .filter(|(u, _)| u.is_active)
        .ok_or_else(|| SuperManagerError::AuthenticationFailed(USER_NOT_FOUND.to_string()))?;

    let (access, access_claims) = jwt::encode_access_token(user.id, config)?;

    Ok(RefreshedToken {
        access,
        user: UserInfo::new(&user, profile.as_ref()),
        exp: access_claims.exp,
    })
}

/// Succeeds for any well-signed, unexpired token.
pub fn verify(config: &TokenConfig, request: &VerifyRequest) -> anyhow::Result<()> {
    let token = present(&request.token)
        .ok_or_else(|| SuperManagerError::field("token", REQUIRED))?;

    jwt::decode_token(token, &config.signing_key)
        .map_err(|_| SuperManagerError::TokenNotValid(TOKEN_INVALID.to_string()))?;

    Ok(())
}

/// Builds the auth context of a request from its bearer token.
pub fn context_from_token(token: &str, signing_key: &str) -> AuthContext {
    match jwt::decode_token_cached(token, signing_key) {
        Ok(claims) if claims.is_access() => AuthContext {
            user_id: Some(claims.user_id),
            token_provided: true,
            ..Default::default()
        },
        Ok(_) => AuthContext {
            wrong_token_type: true,
            token_provided: true,
            ..Default::default()
        },
        Err(e) => AuthContext {
            jwt_error: Some(e),
            token_provided: true,
            ..Default::default()
        },
    }
}

/// Changes the caller's own password after checking the current one.
pub async fn change_password(
    db: &DatabaseConnection,
    current_user: &users::Model,
    request: &ChangePasswordRequest,
) -> anyhow::Result<MessageResponse> {
    let Some(id) = request.id else {
        return Err(SuperManagerError::field("id", REQUIRED).into());
    };
    if id != current_user.id {
        return Err(SuperManagerError::IllegalArgument(ONLY_OWN_PASSWORD.to_string()).into());
    }

    let mut errors = FieldErrors::new();
    require(
        &mut errors,
        &[
            ("current_password", &request.current_password),
            ("password", &request.password),
            ("repeat_password", &request.repeat_password),
        ],
    );
    check_new_password(
        &mut errors,
        request.password.as_deref(),
        request.repeat_password.as_deref(),
    );
    errors.into_result()?;

    let current_password = request.current_password.as_deref().unwrap_or_default();
    if !user::verify_password(current_password, &current_user.password) {
        return Err(SuperManagerError::field("current_password", CURRENT_PASSWORD_INCORRECT).into());
    }

    let password = request.password.as_deref().unwrap_or_default();
    user::set_password(db, current_user.clone(), password).await?;

    info!(user_id = current_user.id, "Password changed");

    Ok(MessageResponse::new(PASSWORD_CHANGED))
}

/// Sets the password of user `id` on behalf of an administrator.
pub async fn admin_change_password(
    db: &DatabaseConnection,
    request: &ChangePasswordRequest,
) -> anyhow::Result<MessageResponse> {
    let Some(id) = request.id else {
        return Err(SuperManagerError::field("id", REQUIRED).into());
    };

    let mut errors = FieldErrors::new();
    require(
        &mut errors,
        &[
            ("password", &request.password),
            ("repeat_password", &request.repeat_password),
        ],
    );
    check_new_password(
        &mut errors,
        request.password.as_deref(),
        request.repeat_password.as_deref(),
    );
    errors.into_result()?;

    let target = user::find_by_id(db, id)
        .await?
        .ok_or(SuperManagerError::NotFound)?;

    let password = request.password.as_deref().unwrap_or_default();
    user::set_password(db, target, password).await?;

    info!(user_id = id, "Password changed by admin");

    Ok(MessageResponse::new(PASSWORD_CHANGED_BY_ADMIN))
}

/// Issues a reset link for the account owning `forgot_email`.
///
/// Unknown addresses get the same response as known ones and nothing is sent.
pub async fn forgot_password(
    db: &DatabaseConnection,
    config: &PasswordResetConfig,
    mail: &MailService,
    request: &ForgotPasswordRequest,
) -> anyhow::Result<ForgotPasswordResponse> {
    let email = present(&request.forgot_email)
        .ok_or_else(|| SuperManagerError::field("forgot_email", REQUIRED))?;
    if !is_valid_email(email) {
        return Err(SuperManagerError::field("forgot_email", INVALID_EMAIL).into());
    }

    let Some(user) = user::find_by_email(db, email).await? else {
        return Ok(ForgotPasswordResponse::Email {
            email: email.to_string(),
        });
    };

    let uid = password_reset::encode_uid(user.id);
    let token = password_reset::make_token(&user, &config.secret, Utc::now().timestamp())?;
    let reset_url =
        password_reset::build_reset_url(&config.url_template, &config.frontend_url, &uid, &token);

    if mail.config().enabled {
        let body = config.message_template.replace("{reset_url}", &reset_url);
        if !mail.send_mail(email, &config.subject, &body).await {
            warn!(user_id = user.id, "Password reset mail was not delivered");
        }
    }

    if is_development_environment(&config.environment) {
        return Ok(ForgotPasswordResponse::Link {
            message: format!(
                "[DEVELOPMENT-ONLY] Password reset link for {}: {}",
                email, reset_url
            ),
        });
    }

    Ok(ForgotPasswordResponse::Email {
        email: email.to_string(),
    })
}

/// Completes a reset started by [`forgot_password`].
pub async fn reset_password(
    db: &DatabaseConnection,
    config: &PasswordResetConfig,
    request: &ResetPasswordRequest,
) -> anyhow::Result<MessageResponse> {
    let mut errors = FieldErrors::new();
    require(
        &mut errors,
        &[
            ("uid", &request.uid),
            ("token", &request.token),
            ("password", &request.password),
            ("repeat_password", &request.repeat_password),
        ],
    );
    check_new_password(
        &mut errors,
        request.password.as_deref(),
        request.repeat_password.as_deref(),
    );
    errors.into_result()?;

    let invalid = || SuperManagerError::IllegalArgument(RESET_LINK_INVALID.to_string());

    let id = password_reset::decode_uid(request.uid.as_deref().unwrap_or_default())
        .ok_or_else(invalid)?;
    let target = user::find_by_id(db, id).await?.ok_or_else(invalid)?;

    let valid = password_reset::check_token(
        &target,
        request.token.as_deref().unwrap_or_default(),
        &config.secret,
        config.timeout_seconds,
        Utc::now().timestamp(),
    );
    if !valid {
        return Err(invalid().into());
    }

    let password = request.password.as_deref().unwrap_or_default();
    user::set_password(db, target, password).await?;

    info!(user_id = id, "Password reset completed");

    Ok(MessageResponse::new(PASSWORD_RESET_DONE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_password_request_accepts_string_id() {
        let req: ChangePasswordRequest = serde_json::from_str(r#"{"id":"7"}"#).unwrap();
        assert_eq!(req.id, Some(7));

        let req: ChangePasswordRequest = serde_json::from_str(r#"{"id":7}"#).unwrap();
        assert_eq!(req.id, Some(7));

        let req: ChangePasswordRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(req.id, None);

        assert!(serde_json::from_str::<ChangePasswordRequest>(r#"{"id":"x"}"#).is_err());
    }

    #[test]
    fn test_check_new_password() {
        let mut errors = FieldErrors::new();
        check_new_password(&mut errors, Some("password1"), Some("password2"));
        assert_eq!(errors.get("password"), Some(&[PASSWORDS_DO_NOT_MATCH.to_string()][..]));

        let mut errors = FieldErrors::new();
        check_new_password(&mut errors, Some("short"), Some("short"));
        assert!(errors.contains("password"));
        assert!(errors.contains("repeat_password"));

        let mut errors = FieldErrors::new();
        check_new_password(&mut errors, Some("password1"), Some("password1"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_context_from_token() {
        let config = TokenConfig {
            signing_key: "context-key".to_string(),
            ..Default::default()
        };

        let (access, _) = jwt::encode_access_token(5, &config).unwrap();
        let ctx = context_from_token(&access, &config.signing_key);
        assert!(ctx.is_valid());
        assert_eq!(ctx.user_id, Some(5));

        let (refresh, _) = jwt::encode_refresh_token(5, &config).unwrap();
        let ctx = context_from_token(&refresh, &config.signing_key);
        assert!(!ctx.is_valid());
        assert_eq!(ctx.jwt_error_string(), TOKEN_WRONG_TYPE);

        let ctx = context_from_token("garbage", &config.signing_key);
        assert!(!ctx.is_valid());
        assert_eq!(ctx.jwt_error_string(), TOKEN_INVALID);
    }

    #[test]
    fn test_verify_requires_token() {
        let config = TokenConfig::default();
        assert!(verify(&config, &VerifyRequest::default()).is_err());
    }
}
