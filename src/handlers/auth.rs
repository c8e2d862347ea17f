use worker::{Env, Request, Response, Result};

use crate::handlers::error_response;
use crate::log_info;
use crate::middleware::authenticate_member;
use crate::responses::ApiResponse;
use crate::services::attribution::parse_start_param;
use crate::services::D1Service;
use crate::types::UserRecord;
use crate::utils::time::current_timestamp_ms;

/// Registers or refreshes the calling member from validated init data.
///
/// Attribution is first-touch: UTM tags from the deep-link start param are
/// written only when the user row is created, never on later visits.
pub async fn handle_auth_init(req: Request, env: Env) -> Result<Response> {
    let init = match authenticate_member(&req, &env) {
        Ok(init) => init,
        Err(e) => return error_response(&e),
    };

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let user_id = init.user.id.to_string();
    let existing = match db.get_user(&user_id).await {
        Ok(existing) => existing,
        Err(e) => return error_response(&e),
    };

    let user = match existing {
        Some(mut user) => {
            user.username = init.user.username.clone();
            user.first_name = init.user.first_name.clone();
            user.photo_url = init.user.photo_url.clone();
            user.registered = true;
            user.updated_at = current_timestamp_ms();
            user
        }
        None => {
            let mut user = UserRecord::new(user_id.clone());
            user.username = init.user.username.clone();
            user.first_name = init.user.first_name.clone();
            user.photo_url = init.user.photo_url.clone();
            user.registered = true;

            let tags = parse_start_param(init.start_param.as_deref());
            if !tags.is_empty() {
                tags.apply_to_user(&mut user);
            }
            log_info!(
                "New member registered",
                serde_json::json!({ "user_id": user_id, "attributed": !tags.is_empty() })
            );
            user
        }
    };

    if let Err(e) = db.upsert_user(&user).await {
        return error_response(&e);
    }

    let response = ApiResponse::success(user);
    Response::from_json(&response)
}
