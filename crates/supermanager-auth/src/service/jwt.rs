//! JWT token service

use std::sync::LazyLock;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use moka::sync::Cache;

use crate::model::{ACCESS_TOKEN_TYPE, JwtPayload, REFRESH_TOKEN_TYPE, TokenConfig};

/// Decoded claims keyed by the raw token, so repeated requests skip the
/// signature check.
static TOKEN_CACHE: LazyLock<Cache<String, JwtPayload>> = LazyLock::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300))
        .build()
});

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);
    validation
}

/// Decode and validate JWT token with caching
pub fn decode_token_cached(token: &str, signing_key: &str) -> jsonwebtoken::errors::Result<JwtPayload> {
    if let Some(claims) = TOKEN_CACHE.get(token) {
        if claims.exp > Utc::now().timestamp() {
            return Ok(claims);
        }
        TOKEN_CACHE.invalidate(token);
    }

    let claims = decode_token(token, signing_key)?;
    TOKEN_CACHE.insert(token.to_string(), claims.clone());

    Ok(claims)
}

/// Decode and validate JWT token without caching
pub fn decode_token(token: &str, signing_key: &str) -> jsonwebtoken::errors::Result<JwtPayload> {
    let decoding_key = DecodingKey::from_secret(signing_key.as_bytes());
    decode::<JwtPayload>(token, &decoding_key, &validation()).map(|data| data.claims)
}

pub fn encode_token(
    user_id: i32,
    token_type: &str,
    signing_key: &str,
    lifetime: chrono::Duration,
) -> jsonwebtoken::errors::Result<(String, JwtPayload)> {
    let now = Utc::now();
    let payload = JwtPayload {
        token_type: token_type.to_string(),
        exp: now
            .checked_add_signed(lifetime)
            .unwrap_or(now)
            .timestamp(),
        iat: now.timestamp(),
        jti: uuid::Uuid::new_v4().simple().to_string(),
        user_id,
    };

    let encoding_key = EncodingKey::from_secret(signing_key.as_bytes());
    let token = encode(&Header::new(Algorithm::HS256), &payload, &encoding_key)?;

    Ok((token, payload))
}

pub fn encode_access_token(
    user_id: i32,
    config: &TokenConfig,
) -> jsonwebtoken::errors::Result<(String, JwtPayload)> {
    encode_token(
        user_id,
        ACCESS_TOKEN_TYPE,
        &config.signing_key,
        config.access_lifetime,
    )
}

pub fn encode_refresh_token(
    user_id: i32,
    config: &TokenConfig,
) -> jsonwebtoken::errors::Result<(String, JwtPayload)> {
    encode_token(
        user_id,
        REFRESH_TOKEN_TYPE,
        &config.signing_key,
        config.refresh_lifetime,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "unit-test-signing-key";

    fn config() -> TokenConfig {
        TokenConfig {
            signing_key: KEY.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_decode_access_token() {
        let (token, payload) = encode_access_token(42, &config()).unwrap();
        let decoded = decode_token(&token, KEY).unwrap();

        assert_eq!(decoded, payload);
        assert_eq!(decoded.user_id, 42);
        assert!(decoded.is_access());
        assert!(decoded.exp > decoded.iat);
    }

    #[test]
    fn test_refresh_token_type() {
        let (token, _) = encode_refresh_token(1, &config()).unwrap();
        let decoded = decode_token_cached(&token, KEY).unwrap();
        assert!(decoded.is_refresh());
        assert_eq!(decoded.exp - decoded.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let (token, _) = encode_access_token(1, &config()).unwrap();
        assert!(decode_token(&token, "another-key").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let (token, _) =
            encode_token(1, ACCESS_TOKEN_TYPE, KEY, chrono::Duration::seconds(-10)).unwrap();
        let err = decode_token(&token, KEY).unwrap_err();
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn test_jti_is_unique() {
        let (_, a) = encode_access_token(1, &config()).unwrap();
        let (_, b) = encode_access_token(1, &config()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(decode_token_cached("not.a.jwt", KEY).is_err());
    }
}
