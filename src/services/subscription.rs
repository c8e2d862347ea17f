// src/services/subscription.rs

//! Community-channel membership check through the Bot API. The Mini App
//! gates parts of its navigation on the member being subscribed to the
//! club channel.

use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use worker::Env;

use crate::utils::{PortalError, PortalResult};

/// `getChatMember` statuses that count as subscribed.
const MEMBER_STATUSES: [&str; 3] = ["member", "administrator", "creator"];

pub struct SubscriptionService {
    bot_token: Secret<String>,
    chat_id: String,
}

impl SubscriptionService {
    pub fn new(env: &Env) -> PortalResult<Self> {
        let bot_token = env
            .var("TELEGRAM_BOT_TOKEN")
            .map(|v| Secret::new(v.to_string()))
            .map_err(|_| PortalError::config_error("Missing TELEGRAM_BOT_TOKEN"))?;
        let chat_id = env
            .var("COMMUNITY_CHAT_ID")
            .map(|v| v.to_string())
            .map_err(|_| PortalError::config_error("Missing COMMUNITY_CHAT_ID"))?;

        Ok(Self { bot_token, chat_id })
    }

    /// Asks the Bot API whether the user belongs to the community channel.
    pub async fn is_subscribed(&self, user_id: i64) -> PortalResult<bool> {
        let url = format!(
            "https://api.telegram.org/bot{}/getChatMember?chat_id={}&user_id={}",
            self.bot_token.expose_secret(),
            self.chat_id,
            user_id
        );

        let response = reqwest::get(&url)
            .await
            .map_err(|e| PortalError::telegram_error(format!("getChatMember failed: {}", e)))?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| PortalError::telegram_error(format!("getChatMember bad body: {}", e)))?;

        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let description = body
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(PortalError::telegram_error(format!(
                "getChatMember rejected: {}",
                description
            )));
        }

        let status = body
            .pointer("/result/status")
            .and_then(Value::as_str)
            .unwrap_or("");
        Ok(is_member_status(status))
    }
}

pub fn is_member_status(status: &str) -> bool {
    MEMBER_STATUSES.contains(&status)
}
