// Security context and authorization macro for API access control

use actix_web::{HttpMessage, HttpRequest, web};

use supermanager_auth::model::USER_NOT_FOUND;
use supermanager_auth::service::user;
use supermanager_common::SuperManagerError;
use supermanager_persistence::entity::users;

use crate::model::app_state::AppState;

// Re-export auth types needed by the secured! macro
pub use supermanager_auth::model::AuthContext;

/// Who may call an endpoint once a valid access token was presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessLevel {
    /// Any active user
    #[default]
    Authenticated,
    /// Active users with `is_staff`
    Staff,
}

// Security context for API access control
#[derive(Debug, Clone)]
pub struct Secured<'a> {
    pub req: &'a HttpRequest,          // HTTP request reference
    pub data: &'a web::Data<AppState>, // Application state
    pub resource: &'a str,             // Target resource name
    pub access: AccessLevel,           // Required access level
}

impl<'a> Secured<'a> {
    pub fn builder(
        req: &'a HttpRequest,
        data: &'a web::Data<AppState>,
        resource: &'a str,
    ) -> SecuredBuilder<'a> {
        SecuredBuilder::new(req, data, resource)
    }

    /// The auth context the authentication middleware attached to the request
    pub fn auth_context(&self) -> AuthContext {
        self.req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default()
    }

    /// Resolves the calling user and checks it against the required access level.
    pub async fn authorize(&self) -> anyhow::Result<users::Model> {
        let ctx = self.auth_context();

        if !ctx.token_provided {
            return Err(SuperManagerError::NotAuthenticated.into());
        }

        let user_id = match ctx.user_id {
            Some(id) if ctx.is_valid() => id,
            _ => {
                tracing::debug!(
                    resource = self.resource,
                    reason = %ctx.jwt_error_string(),
                    "Rejected bearer token"
                );
                return Err(SuperManagerError::TokenNotValid(ctx.jwt_error_string()).into());
            }
        };

        let current = user::find_by_id(self.data.db(), user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| SuperManagerError::AuthenticationFailed(USER_NOT_FOUND.to_string()))?;

        if self.access == AccessLevel::Staff && !current.is_staff {
            tracing::info!(
                user_id = current.id,
                resource = self.resource,
                "Staff access denied"
            );
            return Err(SuperManagerError::PermissionDenied.into());
        }

        Ok(current)
    }
}

#[derive(Debug, Clone)]
pub struct SecuredBuilder<'a> {
    req: &'a HttpRequest,
    data: &'a web::Data<AppState>,
    resource: &'a str,
    access: AccessLevel,
}

impl<'a> SecuredBuilder<'a> {
    pub fn new(req: &'a HttpRequest, data: &'a web::Data<AppState>, resource: &'a str) -> Self {
        SecuredBuilder::<'a> {
            req,
            data,
            resource,
            access: AccessLevel::default(),
        }
    }

    pub fn resource(mut self, resource: &'a str) -> Self {
        self.resource = resource;
        self
    }

    pub fn access(mut self, access: AccessLevel) -> Self {
        self.access = access;
        self
    }

    pub fn staff(self) -> Self {
        self.access(AccessLevel::Staff)
    }

    pub fn build(self) -> Secured<'a> {
        Secured::<'a> {
            req: self.req,
            data: self.data,
            resource: self.resource,
            access: self.access,
        }
    }
}

/// Authorizes the request or returns the error response from the enclosing
/// handler. Evaluates to the current `users::Model`.
#[macro_export]
macro_rules! secured {
    ($secured: expr) => {{
        let __secured = $secured;

        match __secured.authorize().await {
            Ok(__user) => __user,
            Err(__e) => return Err($crate::error::AppError::from(__e)),
        }
    }};
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use sea_orm::{ConnectOptions, Database};

    use supermanager_auth::service::jwt;
    use supermanager_auth::service::user::UserForm;
    use supermanager_migration::{Migrator, MigratorTrait};

    use super::*;
    use crate::model::config::Configuration;

    async fn state() -> web::Data<AppState> {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let config = config::Config::builder()
            .set_override("secret_key", "secured-test-secret")
            .unwrap()
            .build()
            .unwrap();

        web::Data::new(AppState::new(Configuration::from_config(config), db).unwrap())
    }

    async fn create_user(data: &AppState, username: &str, staff: bool, active: bool) -> i32 {
        let form = UserForm {
            username: Some(username.to_string()),
            email: Some(format!("{}@example.com", username)),
            is_staff: Some(staff),
            is_active: Some(active),
            ..Default::default()
        };
        user::create(data.db(), &form).await.unwrap().0.id
    }

    fn request_with(ctx: Option<AuthContext>) -> HttpRequest {
        let req = TestRequest::get().uri("/devices/").to_http_request();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req
    }

    fn access_context(data: &AppState, user_id: i32) -> AuthContext {
        let (token, _) = jwt::encode_access_token(user_id, &data.token_config).unwrap();
        supermanager_auth::service::auth::context_from_token(&token, &data.token_config.signing_key)
    }

    fn error_of(result: anyhow::Result<users::Model>) -> SuperManagerError {
        result.unwrap_err().downcast::<SuperManagerError>().unwrap()
    }

    #[actix_rt::test]
    async fn test_missing_token_is_not_authenticated() {
        let data = state().await;
        let req = request_with(None);

        let secured = Secured::builder(&req, &data, "devices").build();
        assert!(matches!(
            error_of(secured.authorize().await),
            SuperManagerError::NotAuthenticated
        ));
    }

    #[actix_rt::test]
    async fn test_refresh_token_does_not_authenticate() {
        let data = state().await;
        let id = create_user(&data, "reader", false, true).await;
        let (token, _) = jwt::encode_refresh_token(id, &data.token_config).unwrap();
        let ctx = supermanager_auth::service::auth::context_from_token(&token, &data.token_config.signing_key);
        let req = request_with(Some(ctx));

        let secured = Secured::builder(&req, &data, "devices").build();
        assert!(matches!(
            error_of(secured.authorize().await),
            SuperManagerError::TokenNotValid(_)
        ));
    }

    #[actix_rt::test]
    async fn test_staff_level() {
        let data = state().await;
        let reader = create_user(&data, "reader", false, true).await;
        let admin = create_user(&data, "admin", true, true).await;

        let req = request_with(Some(access_context(&data, reader)));
        let current = Secured::builder(&req, &data, "users").build().authorize().await.unwrap();
        assert_eq!(current.id, reader);

        let denied = Secured::builder(&req, &data, "users").staff().build().authorize().await;
        assert!(matches!(error_of(denied), SuperManagerError::PermissionDenied));

        let req = request_with(Some(access_context(&data, admin)));
        let current = Secured::builder(&req, &data, "users")
            .staff()
            .build()
            .authorize()
            .await
            .unwrap();
        assert!(current.is_staff);
    }

    #[actix_rt::test]
    async fn test_inactive_user_is_rejected() {
        let data = state().await;
        let id = create_user(&data, "dormant", false, false).await;
        let req = request_with(Some(access_context(&data, id)));

        let result = Secured::builder(&req, &data, "devices").build().authorize().await;
        assert!(matches!(
            error_of(result),
            SuperManagerError::AuthenticationFailed(_)
        ));
    }
}
