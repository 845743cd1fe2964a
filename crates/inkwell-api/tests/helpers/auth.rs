use chrono::Utc;
use inkwell_api::auth::SessionClaims;
use jsonwebtoken::{encode, EncodingKey, Header};

/// Shared secret the test verifier accepts (at least 32 characters).
pub const TEST_SESSION_SECRET: &str = "inkwell-test-session-secret-0123456789";

pub const FREE_USER: &str = "user_free";
pub const PREMIUM_USER: &str = "user_premium";

fn sign(claims: &SessionClaims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign session token")
}

fn claims(user_id: &str, pla: Option<&str>, exp_offset_secs: i64) -> SessionClaims {
    let now = Utc::now().timestamp();
    SessionClaims {
        sub: user_id.to_string(),
        exp: now + exp_offset_secs,
        iat: Some(now),
        nbf: None,
        iss: None,
        plan: None,
        pla: pla.map(String::from),
    }
}

pub fn free_token(user_id: &str) -> String {
    sign(&claims(user_id, Some("u:free_user"), 3600), TEST_SESSION_SECRET)
}

pub fn premium_token(user_id: &str) -> String {
    sign(&claims(user_id, Some("u:premium"), 3600), TEST_SESSION_SECRET)
}

pub fn expired_token(user_id: &str) -> String {
    sign(&claims(user_id, None, -3600), TEST_SESSION_SECRET)
}

pub fn forged_token(user_id: &str) -> String {
    sign(
        &claims(user_id, Some("u:premium"), 3600),
        "not-the-test-secret-but-long-enough-anyway",
    )
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
