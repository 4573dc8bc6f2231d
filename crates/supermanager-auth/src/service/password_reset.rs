//! Stateless password reset tokens
//!
//! A token is `<timestamp base36>-<mac>` where the mac is HMAC-SHA256 over the
//! user id, the current password hash, the last login time and the timestamp.
//! Changing the password or logging in invalidates every outstanding token.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use supermanager_persistence::entity::users;

type HmacSha256 = Hmac<Sha256>;

const KEY_SALT: &str = "supermanager.auth.PasswordResetTokenGenerator";

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();

    String::from_utf8_lossy(&out).into_owned()
}

fn from_base36(value: &str) -> Option<u64> {
    if value.is_empty() || value.len() > 13 {
        return None;
    }
    u64::from_str_radix(value, 36).ok()
}

fn mac_for(user: &users::Model, timestamp: u64, secret: &str) -> anyhow::Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(format!("{}{}", KEY_SALT, secret).as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid reset key: {}", e))?;

    let last_login = user
        .last_login
        .map(|v| v.timestamp().to_string())
        .unwrap_or_default();

    mac.update(user.id.to_string().as_bytes());
    mac.update(user.password.as_bytes());
    mac.update(last_login.as_bytes());
    mac.update(timestamp.to_string().as_bytes());

    Ok(mac)
}

/// Issues a reset token for `user` stamped with `now` (unix seconds).
pub fn make_token(user: &users::Model, secret: &str, now: i64) -> anyhow::Result<String> {
    let timestamp = now.max(0) as u64;
    let digest = mac_for(user, timestamp, secret)?.finalize().into_bytes();

    Ok(format!(
        "{}-{}",
        to_base36(timestamp),
        URL_SAFE_NO_PAD.encode(digest)
    ))
}

/// Verifies a reset token. Tokens older than `timeout_seconds` are rejected.
pub fn check_token(
    user: &users::Model,
    token: &str,
    secret: &str,
    timeout_seconds: i64,
    now: i64,
) -> bool {
    let Some((ts, signature)) = token.split_once('-') else {
        return false;
    };
    let Some(timestamp) = from_base36(ts) else {
        return false;
    };
    let Ok(signature) = URL_SAFE_NO_PAD.decode(signature) else {
        return false;
    };

    let Ok(mac) = mac_for(user, timestamp, secret) else {
        return false;
    };
    if mac.verify_slice(&signature).is_err() {
        return false;
    }

    now.saturating_sub(timestamp as i64) <= timeout_seconds
}

/// url-safe base64 of the primary key
pub fn encode_uid(id: i32) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

pub fn decode_uid(uid: &str) -> Option<i32> {
    let bytes = URL_SAFE_NO_PAD.decode(uid.trim_end_matches('=')).ok()?;
    String::from_utf8(bytes).ok()?.parse().ok()
}

pub fn build_reset_url(template: &str, frontend_url: &str, uid: &str, token: &str) -> String {
    template
        .replace("{FRONTEND_URL}", frontend_url.trim_end_matches('/'))
        .replace("{uid}", uid)
        .replace("{token}", token)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const SECRET: &str = "reset-secret";
    const DAY: i64 = 86_400;

    fn user() -> users::Model {
        users::Model {
            id: 12,
            password: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
            last_login: None,
            is_superuser: false,
            username: "reset".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: "reset@example.com".to_string(),
            is_staff: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let now = Utc::now().timestamp();
        let token = make_token(&user(), SECRET, now).unwrap();

        assert!(check_token(&user(), &token, SECRET, 3 * DAY, now));
        assert!(check_token(&user(), &token, SECRET, 3 * DAY, now + DAY));
    }

    #[test]
    fn test_token_expires() {
        let now = Utc::now().timestamp();
        let token = make_token(&user(), SECRET, now).unwrap();

        assert!(!check_token(&user(), &token, SECRET, 3 * DAY, now + 3 * DAY + 1));
    }

    #[test]
    fn test_token_bound_to_password_and_login() {
        let now = Utc::now().timestamp();
        let token = make_token(&user(), SECRET, now).unwrap();

        let mut changed = user();
        changed.password = "$2b$10$zyxwvutsrqponmlkjihgfe".to_string();
        assert!(!check_token(&changed, &token, SECRET, 3 * DAY, now));

        let mut logged_in = user();
        logged_in.last_login = Some(Utc::now());
        assert!(!check_token(&logged_in, &token, SECRET, 3 * DAY, now));

        assert!(!check_token(&user(), &token, "other-secret", 3 * DAY, now));
    }

    #[test]
    fn test_malformed_tokens() {
        let now = Utc::now().timestamp();
        for token in ["", "abc", "-", "zzzzzzzzzzzzzzzzz-abc", "1-!!!"] {
            assert!(!check_token(&user(), token, SECRET, DAY, now), "{token}");
        }
    }

    #[test]
    fn test_uid_roundtrip() {
        assert_eq!(encode_uid(12), "MTI");
        assert_eq!(decode_uid("MTI"), Some(12));
        assert_eq!(decode_uid("MTI="), Some(12));
        assert_eq!(decode_uid("***"), None);
    }

    #[test]
    fn test_build_reset_url() {
        let url = build_reset_url(
            "{FRONTEND_URL}/auth/reset-password/{uid}/{token}",
            "http://localhost:3000/",
            "MTI",
            "abc-def",
        );
        assert_eq!(url, "http://localhost:3000/auth/reset-password/MTI/abc-def");
    }

    proptest::proptest! {
        #[test]
        fn prop_base36_roundtrip(value in 0u64..u64::MAX / 2) {
            proptest::prop_assert_eq!(from_base36(&to_base36(value)), Some(value));
        }
    }
}
