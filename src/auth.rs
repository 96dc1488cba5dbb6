//! Password storage and cookie sessions.
//!
//! Sessions are stateless: the cookie carries `cook_id:issued_at` signed
//! with HMAC-SHA256, encoded as `v1.<payload>.<signature>` in URL-safe
//! unpadded base64. Tokens expire after [`SESSION_TTL`].

use std::future::{ready, Ready};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::KitchenError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "kitchen_session";
pub const SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

const TOKEN_VERSION: &str = "v1";
const PASSWORD_VERSION: &str = "v1";
const SALT_LEN: usize = 16;

fn password_digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = password_digest(&salt, password);
    format!(
        "{PASSWORD_VERSION}${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    )
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let fields: Vec<&str> = stored.split('$').collect();
    if fields.len() != 3 || fields[0] != PASSWORD_VERSION {
        return false;
    }
    let Ok(salt) = URL_SAFE_NO_PAD.decode(fields[1]) else {
        return false;
    };
    let Ok(expected) = URL_SAFE_NO_PAD.decode(fields[2]) else {
        return false;
    };
    constant_time_eq(&password_digest(&salt, password), &expected)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[derive(Clone)]
pub struct SessionSigner {
    mac: HmacSha256,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(secret: &[u8]) -> Self {
        SessionSigner {
            mac: HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 takes keys of any length"),
            ttl: SESSION_TTL,
        }
    }

    pub fn issue(&self, cook_id: i64) -> String {
        self.issue_at(cook_id, unix_now())
    }

    fn issue_at(&self, cook_id: i64, issued_at: u64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!("{cook_id}:{issued_at}"));
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{TOKEN_VERSION}.{payload}.{signature}")
    }

    /// Returns the cook id carried by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Option<i64> {
        let mut parts = token.splitn(3, '.');
        let version = parts.next()?;
        let payload_part = parts.next()?;
        let signature_part = parts.next()?;
        if version != TOKEN_VERSION {
            return None;
        }

        let signature = URL_SAFE_NO_PAD.decode(signature_part).ok()?;
        let mut mac = self.mac.clone();
        mac.update(payload_part.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let payload = String::from_utf8(URL_SAFE_NO_PAD.decode(payload_part).ok()?).ok()?;
        let (cook_id, issued_at) = payload.split_once(':')?;
        let cook_id: i64 = cook_id.parse().ok()?;
        let issued_at: u64 = issued_at.parse().ok()?;

        if unix_now().saturating_sub(issued_at) > self.ttl.as_secs() {
            return None;
        }
        Some(cook_id)
    }
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(actix_web::cookie::time::Duration::seconds(
            SESSION_TTL.as_secs() as i64,
        ))
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// The authenticated requester. Extraction fails with a redirect to the
/// login page when the session cookie is missing, forged or expired.
#[derive(Debug, Clone, Copy)]
pub struct AuthSession {
    pub cook_id: i64,
}

pub fn session_from_request(req: &HttpRequest) -> Option<AuthSession> {
    let state = req.app_data::<web::Data<AppState>>()?;
    let cookie = req.cookie(SESSION_COOKIE)?;
    let cook_id = state.sessions.verify(cookie.value())?;
    Some(AuthSession { cook_id })
}

impl FromRequest for AuthSession {
    type Error = KitchenError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(session_from_request(req).ok_or(KitchenError::AuthRequired))
    }
}
