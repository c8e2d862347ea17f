use std::collections::HashMap;

use base64::{engine::general_purpose, Engine as _};
use uuid::Uuid;
use worker::{Env, Request, Response, Result};

use crate::handlers::error_response;
use crate::log_info;
use crate::middleware::require_admin;
use crate::responses::ApiResponse;
use crate::services::analytics::{build_onboarding_report, build_traffic_report};
use crate::services::{D1Service, MediaStorageService};
use crate::types::{
    MediaUploadRequest, UpsertCourseRequest, UpsertEventRequest, UpsertFaqRequest,
    UpsertMaterialRequest,
};
use crate::utils::time::{current_timestamp_ms, parse_date_from, parse_date_to};

fn query_map(req: &Request) -> Result<HashMap<String, String>> {
    let url = req.url()?;
    Ok(url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

// ============================================================================
// REPORTS
// ============================================================================

/// Traffic-attribution report over an optional creation-date window.
///
/// The three inputs are independent reads and are fetched concurrently;
/// if any of them fails the whole report is abandoned — no partial data.
pub async fn handle_api_admin_traffic_report(req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let query_pairs = query_map(&req)?;
    let date_from = parse_date_from(query_pairs.get("date_from").map(|s| s.as_str()));
    let date_to = parse_date_to(query_pairs.get("date_to").map(|s| s.as_str()));

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let fetched = futures::try_join!(
        db.list_users_created_between(date_from, date_to),
        db.list_prodamus_payments(),
        db.list_lava_payments()
    );

    match fetched {
        Ok((users, prodamus_payments, lava_payments)) => {
            let report = build_traffic_report(&users, &prodamus_payments, &lava_payments);
            log_info!(
                "Traffic report built",
                serde_json::json!({
                    "users": users.len(),
                    "rows": report.rows.len(),
                    "sources": report.sources.len()
                })
            );
            Response::from_json(&ApiResponse::success(report))
        }
        Err(e) => error_response(&e),
    }
}

/// Onboarding funnel over the same optional date window.
pub async fn handle_api_admin_onboarding_report(req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let query_pairs = query_map(&req)?;
    let date_from = parse_date_from(query_pairs.get("date_from").map(|s| s.as_str()));
    let date_to = parse_date_to(query_pairs.get("date_to").map(|s| s.as_str()));

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.list_users_created_between(date_from, date_to).await {
        Ok(users) => {
            let report = build_onboarding_report(&users);
            Response::from_json(&ApiResponse::success(report))
        }
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// USERS
// ============================================================================

/// Paginated user listing for the dashboard
pub async fn handle_api_admin_get_users(req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let query_pairs = query_map(&req)?;
    let limit = query_pairs.get("limit").and_then(|v| v.parse::<i32>().ok());
    let offset = query_pairs.get("offset").and_then(|v| v.parse::<i32>().ok());

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.list_users(limit, offset).await {
        Ok(users) => Response::from_json(&ApiResponse::success(users)),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// MATERIALS
// ============================================================================

pub async fn handle_api_admin_list_materials(req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.list_materials(false, None).await {
        Ok(materials) => Response::from_json(&ApiResponse::success(materials)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_create_material(mut req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let create_request: UpsertMaterialRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Invalid JSON format: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    if let Err(validation_error) = create_request.validate() {
        let response = ApiResponse::<()>::error(format!("Validation error: {}", validation_error));
        return Ok(Response::from_json(&response)?.with_status(400));
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let material = create_request.into_material(Uuid::new_v4().to_string());
    match db.store_material(&material).await {
        Ok(()) => Response::from_json(&ApiResponse::success(material)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_update_material(
    mut req: Request,
    env: Env,
    id: &str,
) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let update_request: UpsertMaterialRequest = match req.json().await {
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

    let existing = match db.get_material(id).await {
        Ok(Some(existing)) => existing,
        Ok(None) => {
            let response = ApiResponse::<()>::error("Material not found".to_string());
            return Ok(Response::from_json(&response)?.with_status(404));
        }
        Err(e) => return error_response(&e),
    };

    let mut material = update_request.into_material(id.to_string());
    material.created_at = existing.created_at;
    material.updated_at = current_timestamp_ms();

    match db.store_material(&material).await {
        Ok(()) => Response::from_json(&ApiResponse::success(material)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_delete_material(req: Request, env: Env, id: &str) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.delete_material(id).await {
        Ok(()) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "id": id,
            "deleted": true
        }))),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// EVENTS
// ============================================================================

pub async fn handle_api_admin_list_events(req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.list_events(false, None).await {
        Ok(events) => Response::from_json(&ApiResponse::success(events)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_create_event(mut req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let create_request: UpsertEventRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Invalid JSON format: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    if let Err(validation_error) = create_request.validate() {
        let response = ApiResponse::<()>::error(format!("Validation error: {}", validation_error));
        return Ok(Response::from_json(&response)?.with_status(400));
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let event = create_request.into_event(Uuid::new_v4().to_string());
    match db.store_event(&event).await {
        Ok(()) => Response::from_json(&ApiResponse::success(event)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_update_event(mut req: Request, env: Env, id: &str) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let update_request: UpsertEventRequest = match req.json().await {
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

    let existing = match db.get_event(id).await {
        Ok(Some(existing)) => existing,
        Ok(None) => {
            let response = ApiResponse::<()>::error("Event not found".to_string());
            return Ok(Response::from_json(&response)?.with_status(404));
        }
        Err(e) => return error_response(&e),
    };

    let mut event = update_request.into_event(id.to_string());
    event.created_at = existing.created_at;
    event.updated_at = current_timestamp_ms();

    match db.store_event(&event).await {
        Ok(()) => Response::from_json(&ApiResponse::success(event)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_delete_event(req: Request, env: Env, id: &str) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.delete_event(id).await {
        Ok(()) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "id": id,
            "deleted": true
        }))),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// FAQ
// ============================================================================

pub async fn handle_api_admin_list_faq(req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.list_faq(false).await {
        Ok(items) => Response::from_json(&ApiResponse::success(items)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_create_faq(mut req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let create_request: UpsertFaqRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Invalid JSON format: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    if let Err(validation_error) = create_request.validate() {
        let response = ApiResponse::<()>::error(format!("Validation error: {}", validation_error));
        return Ok(Response::from_json(&response)?.with_status(400));
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let item = create_request.into_faq_item(Uuid::new_v4().to_string());
    match db.store_faq_item(&item).await {
        Ok(()) => Response::from_json(&ApiResponse::success(item)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_update_faq(mut req: Request, env: Env, id: &str) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let update_request: UpsertFaqRequest = match req.json().await {
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

    if let Err(e) = ensure_exists(db.get_faq_item(id).await, "FAQ item") {
        return e;
    }

    let item = update_request.into_faq_item(id.to_string());
    match db.store_faq_item(&item).await {
        Ok(()) => Response::from_json(&ApiResponse::success(item)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_delete_faq(req: Request, env: Env, id: &str) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.delete_faq_item(id).await {
        Ok(()) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "id": id,
            "deleted": true
        }))),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// COURSES
// ============================================================================

pub async fn handle_api_admin_list_courses(req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.list_courses(false).await {
        Ok(courses) => Response::from_json(&ApiResponse::success(courses)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_create_course(mut req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let create_request: UpsertCourseRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Invalid JSON format: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    if let Err(validation_error) = create_request.validate() {
        let response = ApiResponse::<()>::error(format!("Validation error: {}", validation_error));
        return Ok(Response::from_json(&response)?.with_status(400));
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let course = create_request.into_course(Uuid::new_v4().to_string());
    match db.store_course(&course).await {
        Ok(()) => Response::from_json(&ApiResponse::success(course)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_update_course(
    mut req: Request,
    env: Env,
    id: &str,
) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let update_request: UpsertCourseRequest = match req.json().await {
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

    if let Err(e) = ensure_exists(db.get_course(id).await, "Course") {
        return e;
    }

    let course = update_request.into_course(id.to_string());
    match db.store_course(&course).await {
        Ok(()) => Response::from_json(&ApiResponse::success(course)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_delete_course(req: Request, env: Env, id: &str) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.delete_course(id).await {
        Ok(()) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "id": id,
            "deleted": true
        }))),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// REVIEWS
// ============================================================================

pub async fn handle_api_admin_list_reviews(req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let query_pairs = query_map(&req)?;
    let pending_only = query_pairs.get("pending").map(|v| v == "true").unwrap_or(false);

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let result = if pending_only {
        db.list_pending_reviews().await
    } else {
        db.list_reviews(false).await
    };

    match result {
        Ok(reviews) => Response::from_json(&ApiResponse::success(reviews)),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_approve_review(req: Request, env: Env, id: &str) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.set_review_approved(id, true).await {
        Ok(()) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "id": id,
            "approved": true
        }))),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_api_admin_delete_review(req: Request, env: Env, id: &str) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.delete_review(id).await {
        Ok(()) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "id": id,
            "deleted": true
        }))),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// MEDIA
// ============================================================================

/// Upload one media object (JSON body with base64 content) to the bucket
pub async fn handle_api_admin_upload_media(mut req: Request, env: Env) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let upload_request: MediaUploadRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Invalid JSON format: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    if let Err(validation_error) = upload_request.validate() {
        let response = ApiResponse::<()>::error(format!("Validation error: {}", validation_error));
        return Ok(Response::from_json(&response)?.with_status(400));
    }

    let bytes = match general_purpose::STANDARD.decode(&upload_request.data) {
        Ok(bytes) => bytes,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Failed to decode base64: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    let storage = match MediaStorageService::new(&env) {
        Ok(storage) => storage,
        Err(e) => return error_response(&e),
    };

    match storage
        .upload(&upload_request.filename, &upload_request.content_type, bytes)
        .await
    {
        Ok((key, url)) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "key": key,
            "url": url
        }))),
        Err(e) => error_response(&e),
    }
}

/// Delete one media object by key
pub async fn handle_api_admin_delete_media(req: Request, env: Env, key: &str) -> Result<Response> {
    if let Err(e) = require_admin(&req, &env) {
        return error_response(&e);
    }

    let storage = match MediaStorageService::new(&env) {
        Ok(storage) => storage,
        Err(e) => return error_response(&e),
    };

    match storage.remove(key).await {
        Ok(()) => Response::from_json(&ApiResponse::success(serde_json::json!({
            "key": key,
            "deleted": true
        }))),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Collapses a fetch-before-update into either "go ahead" or a ready 404.
fn ensure_exists<T>(
    fetched: crate::utils::PortalResult<Option<T>>,
    entity: &str,
) -> std::result::Result<T, Result<Response>> {
    match fetched {
        Ok(Some(found)) => Ok(found),
        Ok(None) => {
            let response = ApiResponse::<()>::error(format!("{} not found", entity));
            Err(Response::from_json(&response).map(|r| r.with_status(404)))
        }
        Err(e) => Err(error_response(&e)),
    }
}
