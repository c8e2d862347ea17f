// src/middleware/auth.rs

//! Request authentication: Mini-App init-data validation for members and
//! the shared-token check for the admin dashboard.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use worker::{Env, Request};

use crate::types::TelegramUser;
use crate::utils::time::current_timestamp_ms;
use crate::utils::{PortalError, PortalResult};

type HmacSha256 = Hmac<Sha256>;

pub const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Init data older than this is rejected even with a valid signature.
const INIT_DATA_MAX_AGE_SECS: i64 = 86_400;

/// Validated init-data fields the portal cares about.
#[derive(Debug, Clone)]
pub struct InitData {
    pub user: TelegramUser,
    pub auth_date: i64,
    pub start_param: Option<String>,
}

/// Validates a raw `initData` query string against the bot token.
///
/// The platform signs the sorted key=value lines (minus `hash`) with
/// HMAC-SHA256 keyed by HMAC("WebAppData", bot_token); anything that does
/// not reproduce the provided hex digest is rejected.
pub fn validate_init_data(init_data: &str, bot_token: &str) -> PortalResult<InitData> {
    let mut provided_hash: Option<String> = None;
    let mut fields: Vec<(String, String)> = Vec::new();

    for (key, value) in url::form_urlencoded::parse(init_data.as_bytes()) {
        if key == "hash" {
            provided_hash = Some(value.into_owned());
        } else {
            fields.push((key.into_owned(), value.into_owned()));
        }
    }

    let provided_hash = provided_hash
        .ok_or_else(|| PortalError::authentication_error("Init data is missing its hash"))?;

    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let check_string = fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n");

    let computed = sign_check_string(&check_string, bot_token)?;
    if computed != provided_hash.to_lowercase() {
        return Err(PortalError::authentication_error(
            "Init data signature mismatch",
        ));
    }

    let mut user: Option<TelegramUser> = None;
    let mut auth_date = 0_i64;
    let mut start_param: Option<String> = None;

    for (key, value) in &fields {
        match key.as_str() {
            "user" => {
                user = serde_json::from_str(value).ok();
            }
            "auth_date" => {
                auth_date = value.parse().unwrap_or(0);
            }
            "start_param" => {
                start_param = Some(value.clone());
            }
            _ => {}
        }
    }

    let user =
        user.ok_or_else(|| PortalError::authentication_error("Init data has no user field"))?;

    let now_secs = current_timestamp_ms() / 1000;
    if auth_date <= 0 || now_secs - auth_date > INIT_DATA_MAX_AGE_SECS {
        return Err(PortalError::authentication_error("Init data has expired"));
    }

    Ok(InitData {
        user,
        auth_date,
        start_param,
    })
}

/// Computes the expected init-data digest for a check string.
pub fn sign_check_string(check_string: &str, bot_token: &str) -> PortalResult<String> {
    let mut secret = HmacSha256::new_from_slice(b"WebAppData")
        .map_err(|_| PortalError::internal_error("Failed to derive init-data secret"))?;
    secret.update(bot_token.as_bytes());
    let secret_key = secret.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret_key)
        .map_err(|_| PortalError::internal_error("Failed to initialize init-data HMAC"))?;
    mac.update(check_string.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Authenticates a member request from its init-data header.
pub fn authenticate_member(req: &Request, env: &Env) -> PortalResult<InitData> {
    let raw = req
        .headers()
        .get(INIT_DATA_HEADER)
        .ok()
        .flatten()
        .ok_or_else(|| PortalError::authentication_error("Authentication required"))?;

    let bot_token = env
        .var("TELEGRAM_BOT_TOKEN")
        .map(|v| v.to_string())
        .map_err(|_| PortalError::config_error("Missing TELEGRAM_BOT_TOKEN"))?;

    validate_init_data(&raw, &bot_token)
}

/// Authenticates an admin request from its shared-token header.
pub fn require_admin(req: &Request, env: &Env) -> PortalResult<()> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .ok()
        .flatten()
        .ok_or_else(|| PortalError::unauthorized("Admin token required"))?;

    let expected = env
        .var("ADMIN_API_TOKEN")
        .map(|v| Secret::new(v.to_string()))
        .map_err(|_| PortalError::config_error("Missing ADMIN_API_TOKEN"))?;

    if provided != *expected.expose_secret() {
        return Err(PortalError::access_denied("Invalid admin token"));
    }

    Ok(())
}
