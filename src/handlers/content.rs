use std::collections::HashMap;

use uuid::Uuid;
use worker::{Env, Request, Response, Result};

use crate::handlers::error_response;
use crate::middleware::authenticate_member;
use crate::responses::ApiResponse;
use crate::services::D1Service;
use crate::types::{Review, SubmitReviewRequest};
use crate::utils::time::current_timestamp_ms;

/// List published materials, optionally narrowed to one category
pub async fn handle_api_get_materials(req: Request, env: Env) -> Result<Response> {
    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let url = req.url()?;
    let query_pairs: HashMap<String, String> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let category = query_pairs.get("category").map(|s| s.as_str());

    match db.list_materials(true, category).await {
        Ok(materials) => Response::from_json(&ApiResponse::success(materials)),
        Err(e) => error_response(&e),
    }
}

/// Get one published material by id
pub async fn handle_api_get_material(_req: Request, env: Env, id: &str) -> Result<Response> {
    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.get_material(id).await {
        Ok(Some(material)) if material.published => {
            Response::from_json(&ApiResponse::success(material))
        }
        Ok(_) => {
            let response = ApiResponse::<()>::error("Material not found".to_string());
            Ok(Response::from_json(&response)?.with_status(404))
        }
        Err(e) => error_response(&e),
    }
}

/// List published events; `?upcoming=true` hides past ones
pub async fn handle_api_get_events(req: Request, env: Env) -> Result<Response> {
    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let url = req.url()?;
    let upcoming = url
        .query_pairs()
        .any(|(key, value)| key == "upcoming" && value == "true");
    let starts_after = upcoming.then(current_timestamp_ms);

    match db.list_events(true, starts_after).await {
        Ok(events) => Response::from_json(&ApiResponse::success(events)),
        Err(e) => error_response(&e),
    }
}

/// List published FAQ entries
pub async fn handle_api_get_faq(_req: Request, env: Env) -> Result<Response> {
    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.list_faq(true).await {
        Ok(items) => Response::from_json(&ApiResponse::success(items)),
        Err(e) => error_response(&e),
    }
}

/// List approved reviews, newest first
pub async fn handle_api_get_reviews(_req: Request, env: Env) -> Result<Response> {
    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    match db.list_reviews(true).await {
        Ok(reviews) => Response::from_json(&ApiResponse::success(reviews)),
        Err(e) => error_response(&e),
    }
}

/// Submit a review; it stays hidden until an admin approves it
pub async fn handle_api_submit_review(mut req: Request, env: Env) -> Result<Response> {
    let init = match authenticate_member(&req, &env) {
        Ok(init) => init,
        Err(e) => return error_response(&e),
    };

    let submit_request: SubmitReviewRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Invalid JSON format: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    if let Err(validation_error) = submit_request.validate() {
        let response = ApiResponse::<()>::error(format!("Validation error: {}", validation_error));
        return Ok(Response::from_json(&response)?.with_status(400));
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let author_name = submit_request
        .author_name
        .clone()
        .or_else(|| init.user.first_name.clone())
        .or_else(|| init.user.username.clone())
        .unwrap_or_else(|| "Anonymous".to_string());

    let review = Review {
        id: Uuid::new_v4().to_string(),
        user_id: init.user.id.to_string(),
        author_name,
        text: submit_request.text.trim().to_string(),
        rating: submit_request.rating,
        approved: false,
        created_at: current_timestamp_ms(),
    };

    match db.insert_review(&review).await {
        Ok(()) => Response::from_json(&ApiResponse::success(review)),
        Err(e) => error_response(&e),
    }
}
