//! Authentication models
//!
//! This file defines JWT claims, the per-request auth context, the user
//! representations returned by the API, and the settings the auth flows need.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use jsonwebtoken::errors::ErrorKind;
use serde::{Deserialize, Serialize};

use supermanager_persistence::entity::{user_profiles, users};

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TOKEN_PREFIX: &str = "Bearer ";

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 60;
pub const DEFAULT_TOKEN_REFRESH_LIFETIME_DAYS: i64 = 7;
pub const DEFAULT_PASSWORD_RESET_TIMEOUT_SECONDS: i64 = 259_200;

/// Stored passwords starting with this marker never verify
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";
pub const BCRYPT_COST: u32 = 10;

pub const DEFAULT_RESET_URL: &str = "{FRONTEND_URL}/auth/reset-password/{uid}/{token}";
pub const DEFAULT_RESET_SUBJECT: &str = "[SuperManager] Password Reset";
pub const DEFAULT_RESET_MESSAGE: &str = "Use this link to reset your password: {reset_url}";

pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";
pub const INACTIVE_USER: &str = "User is inactive. Hold on while we reactivate your account.";
pub const TOKEN_INVALID: &str = "Token is invalid.";
pub const TOKEN_EXPIRED: &str = "Token is expired.";
pub const TOKEN_WRONG_TYPE: &str = "Token has wrong type.";
pub const USER_NOT_FOUND: &str = "User not found.";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match.";
pub const PASSWORD_CHANGED: &str = "Password changed successfully.";
pub const PASSWORD_CHANGED_BY_ADMIN: &str = "Password changed successfully by admin.";
pub const ONLY_OWN_PASSWORD: &str = "You can only change your own password.";
pub const CURRENT_PASSWORD_INCORRECT: &str = "Current password is incorrect.";
pub const PASSWORD_RESET_DONE: &str = "Password has been reset successfully.";
pub const RESET_LINK_INVALID: &str = "The reset link is invalid or has expired.";
pub const REGISTER_USERNAME_EXISTS: &str = "Username already exists.";
pub const REGISTER_EMAIL_EXISTS: &str = "Email already exists.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const EMAIL_TAKEN: &str = "A user with that email already exists.";

/// JWT claims for access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtPayload {
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub user_id: i32,
}

impl JwtPayload {
    pub fn is_access(&self) -> bool {
        self.token_type == ACCESS_TOKEN_TYPE
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type == REFRESH_TOKEN_TYPE
    }
}

/// Auth context passed through request extensions
#[derive(Debug, Default, Clone)]
pub struct AuthContext {
    pub user_id: Option<i32>,
    pub jwt_error: Option<jsonwebtoken::errors::Error>,
    pub wrong_token_type: bool,
    pub token_provided: bool,
}

impl AuthContext {
    pub fn jwt_error_string(&self) -> String {
        if self.wrong_token_type {
            return TOKEN_WRONG_TYPE.to_string();
        }

        match &self.jwt_error {
            Some(e) => match e.kind() {
                ErrorKind::ExpiredSignature => TOKEN_EXPIRED.to_string(),
                _ => TOKEN_INVALID.to_string(),
            },
            None => String::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.token_provided
            && self.user_id.is_some()
            && self.jwt_error.is_none()
            && !self.wrong_token_type
    }
}

/// Token lifetimes and signing key
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub signing_key: String,
    pub access_lifetime: Duration,
    pub refresh_lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            access_lifetime: Duration::minutes(DEFAULT_TOKEN_LIFETIME_MINUTES),
            refresh_lifetime: Duration::days(DEFAULT_TOKEN_REFRESH_LIFETIME_DAYS),
        }
    }
}

/// SMTP settings for outgoing mail
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// STARTTLS upgrade on a plain connection
    pub use_tls: bool,
    /// Implicit TLS from the first byte
    pub use_ssl: bool,
    pub from: String,
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".to_string(),
            port: 1025,
            username: None,
            password: None,
            use_tls: false,
            use_ssl: false,
            from: "webmaster@localhost".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Everything the password reset flow needs besides the database
#[derive(Debug, Clone)]
pub struct PasswordResetConfig {
    pub secret: String,
    pub frontend_url: String,
    pub url_template: String,
    pub subject: String,
    pub message_template: String,
    pub timeout_seconds: i64,
    pub environment: String,
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            frontend_url: "http://localhost:3000".to_string(),
            url_template: DEFAULT_RESET_URL.to_string(),
            subject: DEFAULT_RESET_SUBJECT.to_string(),
            message_template: DEFAULT_RESET_MESSAGE.to_string(),
            timeout_seconds: DEFAULT_PASSWORD_RESET_TIMEOUT_SECONDS,
            environment: "production".to_string(),
        }
    }
}

/// Public user object embedded as `creator`/`updater` and returned by login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub avatar: Option<String>,
}

impl UserInfo {
    pub fn new(user: &users::Model, profile: Option<&user_profiles::Model>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            date_joined: user.date_joined,
            last_login: user.last_login,
            avatar: profile.and_then(|p| p.avatar.clone()).filter(|a| !a.is_empty()),
        }
    }
}

impl From<&users::Model> for UserInfo {
    fn from(value: &users::Model) -> Self {
        UserInfo::new(value, None)
    }
}

/// User object with the profile columns flattened in; absent values are `""`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub avatar: String,
    pub title: String,
    pub phone: String,
    pub mobile: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub birth: String,
    pub about: String,
}

impl ExtendedUser {
    pub fn new(user: &users::Model, profile: Option<&user_profiles::Model>) -> Self {
        let text = |f: fn(&user_profiles::Model) -> &Option<String>| {
            profile.and_then(|p| f(p).clone()).unwrap_or_default()
        };

        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            date_joined: user.date_joined,
            last_login: user.last_login,
            avatar: text(|p| &p.avatar),
            title: text(|p| &p.title),
            phone: text(|p| &p.phone),
            mobile: text(|p| &p.mobile),
            address: text(|p| &p.address),
            city: text(|p| &p.city),
            state: text(|p| &p.state),
            zip_code: text(|p| &p.zip_code),
            country: text(|p| &p.country),
            birth: profile
                .and_then(|p| p.birth)
                .map(|d: NaiveDate| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            about: text(|p| &p.about),
        }
    }
}

/// Response of login and token obtain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub user: UserInfo,
    pub exp: i64,
}

/// Response of token refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedToken {
    pub access: String,
    pub user: UserInfo,
    pub exp: i64,
}

/// `{"message": ...}` body of the password endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of forgot-password: the echoed address, or the reset link itself in
/// development environments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForgotPasswordResponse {
    Email { email: String },
    Link { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> users::Model {
        users::Model {
            id: 7,
            password: "!".to_string(),
            last_login: None,
            is_superuser: false,
            username: "jdoe".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "jdoe@example.com".to_string(),
            is_staff: true,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_auth_context_default() {
        let ctx = AuthContext::default();
        assert!(ctx.user_id.is_none());
        assert!(!ctx.token_provided);
        assert!(!ctx.is_valid());
        assert_eq!(ctx.jwt_error_string(), "");
    }

    #[test]
    fn test_auth_context_wrong_type() {
        let ctx = AuthContext {
            user_id: Some(1),
            token_provided: true,
            wrong_token_type: true,
            ..Default::default()
        };
        assert!(!ctx.is_valid());
        assert_eq!(ctx.jwt_error_string(), TOKEN_WRONG_TYPE);
    }

    #[test]
    fn test_user_info_avatar_from_profile() {
        let user = user();
        let profile = user_profiles::Model {
            id: 1,
            user_id: 7,
            avatar: Some("/media/avatars/a.png".to_string()),
            phone: None,
            mobile: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            birth: NaiveDate::from_ymd_opt(1990, 5, 17),
            title: Some("Engineer".to_string()),
            about: None,
        };

        let info = UserInfo::new(&user, Some(&profile));
        assert_eq!(info.avatar.as_deref(), Some("/media/avatars/a.png"));

        let extended = ExtendedUser::new(&user, Some(&profile));
        assert_eq!(extended.title, "Engineer");
        assert_eq!(extended.birth, "1990-05-17");
        assert_eq!(extended.phone, "");

        let bare = ExtendedUser::new(&user, None);
        assert_eq!(bare.avatar, "");
        assert_eq!(bare.birth, "");
    }

    #[test]
    fn test_forgot_password_response_shape() {
        let email = ForgotPasswordResponse::Email {
            email: "a@example.com".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&email).unwrap(),
            serde_json::json!({"email": "a@example.com"})
        );

        let link = ForgotPasswordResponse::Link {
            message: "link".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            serde_json::json!({"message": "link"})
        );
    }

    #[test]
    fn test_user_info_serialization() {
        let info = UserInfo::from(&user());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["username"], "jdoe");
        assert!(json.get("password").is_none());
        assert!(json["avatar"].is_null());
    }
}
