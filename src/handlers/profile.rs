use worker::{Env, Request, Response, Result};

use crate::handlers::error_response;
use crate::middleware::authenticate_member;
use crate::responses::ApiResponse;
use crate::services::course_access::{map_course_access, purchased_product_codes};
use crate::services::{D1Service, SubscriptionService};
use crate::types::{AddFavoriteRequest, Favorite, UpdateProfileRequest};
use crate::utils::time::current_timestamp_ms;

/// Get the calling member's profile
pub async fn handle_api_get_profile(req: Request, env: Env) -> Result<Response> {
    let init = match authenticate_member(&req, &env) {
        Ok(init) => init,
        Err(e) => return error_response(&e),
    };

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.get_user(&init.user.id.to_string()).await {
        Ok(Some(user)) => Response::from_json(&ApiResponse::success(user)),
        Ok(None) => {
            let response = ApiResponse::<()>::error("Profile not found".to_string());
            Ok(Response::from_json(&response)?.with_status(404))
        }
        Err(e) => error_response(&e),
    }
}

/// Update the calling member's profile
pub async fn handle_api_update_profile(mut req: Request, env: Env) -> Result<Response> {
    let init = match authenticate_member(&req, &env) {
        Ok(init) => init,
        Err(e) => return error_response(&e),
    };

    let update_request: UpdateProfileRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Invalid JSON format: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    if let Err(validation_error) = update_request.validate() {
        let response = ApiResponse::<()>::error(format!("Validation error: {}", validation_error));
        return Ok(Response::from_json(&response)?.with_status(400));
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.get_user(&init.user.id.to_string()).await {
        Ok(Some(mut user)) => {
            update_request.apply_to_user(&mut user);
            match db.upsert_user(&user).await {
                Ok(()) => Response::from_json(&ApiResponse::success(user)),
                Err(e) => error_response(&e),
            }
        }
        Ok(None) => {
            let response = ApiResponse::<()>::error("Profile not found".to_string());
            Ok(Response::from_json(&response)?.with_status(404))
        }
        Err(e) => error_response(&e),
    }
}

/// List the member's favorite materials
pub async fn handle_api_get_favorites(req: Request, env: Env) -> Result<Response> {
    let init = match authenticate_member(&req, &env) {
        Ok(init) => init,
        Err(e) => return error_response(&e),
    };

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.list_favorite_materials(&init.user.id.to_string()).await {
        Ok(materials) => Response::from_json(&ApiResponse::success(materials)),
        Err(e) => error_response(&e),
    }
}

/// Save a material to the member's favorites
pub async fn handle_api_add_favorite(mut req: Request, env: Env) -> Result<Response> {
    let init = match authenticate_member(&req, &env) {
        Ok(init) => init,
        Err(e) => return error_response(&e),
    };

    let add_request: AddFavoriteRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Invalid JSON format: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    // Only published materials can be saved.
    match db.get_material(&add_request.material_id).await {
        Ok(Some(material)) if material.published => {}
        Ok(_) => {
            let response = ApiResponse::<()>::error("Material not found".to_string());
            return Ok(Response::from_json(&response)?.with_status(404));
        }
        Err(e) => return error_response(&e),
    }

    let favorite = Favorite {
        user_id: init.user.id.to_string(),
        material_id: add_request.material_id,
        created_at: current_timestamp_ms(),
    };

    match db.add_favorite(&favorite).await {
        Ok(()) => Response::from_json(&ApiResponse::success(favorite)),
        Err(e) => error_response(&e),
    }
}

/// Remove a material from the member's favorites
pub async fn handle_api_remove_favorite(
    req: Request,
    env: Env,
    material_id: &str,
) -> Result<Response> {
    let init = match authenticate_member(&req, &env) {
        Ok(init) => init,
        Err(e) => return error_response(&e),
    };

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db
        .remove_favorite(&init.user.id.to_string(), material_id)
        .await
    {
        Ok(()) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "material_id": material_id,
            "removed": true
        }))),
        Err(e) => error_response(&e),
    }
}

/// Course catalogue with a per-course access flag derived from the
/// member's successful payments
pub async fn handle_api_get_course_access(req: Request, env: Env) -> Result<Response> {
    let init = match authenticate_member(&req, &env) {
        Ok(init) => init,
        Err(e) => return error_response(&e),
    };

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let user_id = init.user.id.to_string();
    let fetched = futures::try_join!(
        db.list_courses(true),
        db.list_prodamus_payments_for_user(&user_id)
    );

    match fetched {
        Ok((courses, payments)) => {
            let purchased = purchased_product_codes(&payments);
            let access = map_course_access(courses, &purchased);
            Response::from_json(&ApiResponse::success(access))
        }
        Err(e) => error_response(&e),
    }
}

/// Community-channel subscription check used to gate navigation
pub async fn handle_api_check_subscription(req: Request, env: Env) -> Result<Response> {
    let init = match authenticate_member(&req, &env) {
        Ok(init) => init,
        Err(e) => return error_response(&e),
    };

    let service = match SubscriptionService::new(&env) {
        Ok(service) => service,
        Err(e) => return error_response(&e),
    };

    match service.is_subscribed(init.user.id).await {
        Ok(subscribed) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "subscribed": subscribed
        }))),
        Err(e) => error_response(&e),
    }
}
