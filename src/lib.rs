use worker::*;

// Module declarations
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod services;
pub mod types;
pub mod utils;

use handlers::*;
use middleware::add_cors_headers;

#[cfg(target_arch = "wasm32")]
use worker::console_log;

#[cfg(not(target_arch = "wasm32"))]
macro_rules! console_log {
    ($($arg:tt)*) => {
        println!($($arg)*);
    };
}

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    utils::logger::set_panic_hook();

    let url = req.url()?;
    let path = url.path().to_string();
    let method = req.method();

    console_log!("🌐 Request: {} {}", method, path);

    // Handle preflight requests
    if method == Method::Options {
        return add_cors_headers(Response::empty()?);
    }

    let response = match (method, path.as_str()) {
        // Health endpoints
        (Method::Get, "/api/v1/health") => handle_api_health_check(req, env).await,
        (Method::Get, "/api/v1/health/detailed") => {
            handle_api_detailed_health_check(req, env).await
        }

        // Member auth + profile
        (Method::Post, "/api/v1/auth/init") => handle_auth_init(req, env).await,
        (Method::Get, "/api/v1/profile") => handle_api_get_profile(req, env).await,
        (Method::Put, "/api/v1/profile") => handle_api_update_profile(req, env).await,

        // Content hub
        (Method::Get, "/api/v1/materials") => handle_api_get_materials(req, env).await,
        (Method::Get, path) if path.starts_with("/api/v1/materials/") => {
            let id = path.strip_prefix("/api/v1/materials/").unwrap_or("").to_string();
            handle_api_get_material(req, env, &id).await
        }
        (Method::Get, "/api/v1/events") => handle_api_get_events(req, env).await,
        (Method::Get, "/api/v1/faq") => handle_api_get_faq(req, env).await,
        (Method::Get, "/api/v1/reviews") => handle_api_get_reviews(req, env).await,
        (Method::Post, "/api/v1/reviews") => handle_api_submit_review(req, env).await,

        // Favorites
        (Method::Get, "/api/v1/favorites") => handle_api_get_favorites(req, env).await,
        (Method::Post, "/api/v1/favorites") => handle_api_add_favorite(req, env).await,
        (Method::Delete, path) if path.starts_with("/api/v1/favorites/") => {
            let material_id = path.strip_prefix("/api/v1/favorites/").unwrap_or("").to_string();
            handle_api_remove_favorite(req, env, &material_id).await
        }

        // Courses + subscription gate
        (Method::Get, "/api/v1/courses/access") => handle_api_get_course_access(req, env).await,
        (Method::Get, "/api/v1/subscription/check") => {
            handle_api_check_subscription(req, env).await
        }

        // Payment provider callbacks
        (Method::Post, "/payments/prodamus/callback") => {
            handle_prodamus_callback(req, env).await
        }
        (Method::Post, "/payments/lava/callback") => handle_lava_callback(req, env).await,

        // Admin: reports
        (Method::Get, "/api/v1/admin/reports/traffic") => {
            handle_api_admin_traffic_report(req, env).await
        }
        (Method::Get, "/api/v1/admin/reports/onboarding") => {
            handle_api_admin_onboarding_report(req, env).await
        }

        // Admin: users
        (Method::Get, "/api/v1/admin/users") => handle_api_admin_get_users(req, env).await,

        // Admin: materials
        (Method::Get, "/api/v1/admin/materials") => {
            handle_api_admin_list_materials(req, env).await
        }
        (Method::Post, "/api/v1/admin/materials") => {
            handle_api_admin_create_material(req, env).await
        }
        (Method::Put, path) if path.starts_with("/api/v1/admin/materials/") => {
            let id = path.strip_prefix("/api/v1/admin/materials/").unwrap_or("").to_string();
            handle_api_admin_update_material(req, env, &id).await
        }
        (Method::Delete, path) if path.starts_with("/api/v1/admin/materials/") => {
            let id = path.strip_prefix("/api/v1/admin/materials/").unwrap_or("").to_string();
            handle_api_admin_delete_material(req, env, &id).await
        }

        // Admin: events
        (Method::Get, "/api/v1/admin/events") => handle_api_admin_list_events(req, env).await,
        (Method::Post, "/api/v1/admin/events") => handle_api_admin_create_event(req, env).await,
        (Method::Put, path) if path.starts_with("/api/v1/admin/events/") => {
            let id = path.strip_prefix("/api/v1/admin/events/").unwrap_or("").to_string();
            handle_api_admin_update_event(req, env, &id).await
        }
        (Method::Delete, path) if path.starts_with("/api/v1/admin/events/") => {
            let id = path.strip_prefix("/api/v1/admin/events/").unwrap_or("").to_string();
            handle_api_admin_delete_event(req, env, &id).await
        }

        // Admin: FAQ
        (Method::Get, "/api/v1/admin/faq") => handle_api_admin_list_faq(req, env).await,
        (Method::Post, "/api/v1/admin/faq") => handle_api_admin_create_faq(req, env).await,
        (Method::Put, path) if path.starts_with("/api/v1/admin/faq/") => {
            let id = path.strip_prefix("/api/v1/admin/faq/").unwrap_or("").to_string();
            handle_api_admin_update_faq(req, env, &id).await
        }
        (Method::Delete, path) if path.starts_with("/api/v1/admin/faq/") => {
            let id = path.strip_prefix("/api/v1/admin/faq/").unwrap_or("").to_string();
            handle_api_admin_delete_faq(req, env, &id).await
        }

        // Admin: courses
        (Method::Get, "/api/v1/admin/courses") => handle_api_admin_list_courses(req, env).await,
        (Method::Post, "/api/v1/admin/courses") => {
            handle_api_admin_create_course(req, env).await
        }
        (Method::Put, path) if path.starts_with("/api/v1/admin/courses/") => {
            let id = path.strip_prefix("/api/v1/admin/courses/").unwrap_or("").to_string();
            handle_api_admin_update_course(req, env, &id).await
        }
        (Method::Delete, path) if path.starts_with("/api/v1/admin/courses/") => {
            let id = path.strip_prefix("/api/v1/admin/courses/").unwrap_or("").to_string();
            handle_api_admin_delete_course(req, env, &id).await
        }

        // Admin: reviews
        (Method::Get, "/api/v1/admin/reviews") => handle_api_admin_list_reviews(req, env).await,
        (Method::Put, path)
            if path.starts_with("/api/v1/admin/reviews/") && path.ends_with("/approve") =>
        {
            let id = path
                .strip_prefix("/api/v1/admin/reviews/")
                .and_then(|rest| rest.strip_suffix("/approve"))
                .unwrap_or("")
                .to_string();
            handle_api_admin_approve_review(req, env, &id).await
        }
        (Method::Delete, path) if path.starts_with("/api/v1/admin/reviews/") => {
            let id = path.strip_prefix("/api/v1/admin/reviews/").unwrap_or("").to_string();
            handle_api_admin_delete_review(req, env, &id).await
        }

        // Admin: media
        (Method::Post, "/api/v1/admin/media") => handle_api_admin_upload_media(req, env).await,
        (Method::Delete, path) if path.starts_with("/api/v1/admin/media/") => {
            let key = path.strip_prefix("/api/v1/admin/media/").unwrap_or("").to_string();
            handle_api_admin_delete_media(req, env, &key).await
        }

        _ => {
            console_log!("❌ Route not found: {}", path);
            Response::error("Not Found", 404)
        }
    };

    add_cors_headers(response?)
}
