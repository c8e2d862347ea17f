use crate::responses::ApiResponse;
use worker::{Env, Request, Response, Result};

/// Basic health check endpoint
pub async fn handle_api_health_check(_req: Request, _env: Env) -> Result<Response> {
    let response = ApiResponse::success(serde_json::json!({
        "status": "healthy",
        "service": "Community Portal API",
        "version": "1.0.0"
    }));
    Response::from_json(&response)
}

/// Detailed health check endpoint that tests the external bindings
pub async fn handle_api_detailed_health_check(_req: Request, env: Env) -> Result<Response> {
    let d1_healthy = env.d1("PortalDB").is_ok();
    let bucket_healthy = env.bucket("PORTAL_MEDIA").is_ok();
    let telegram_healthy = env.var("TELEGRAM_BOT_TOKEN").is_ok();
    let admin_configured = env.var("ADMIN_API_TOKEN").is_ok();

    let overall_healthy = d1_healthy && bucket_healthy && telegram_healthy && admin_configured;

    let response = ApiResponse::success(serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "services": {
            "d1_database": if d1_healthy { "online" } else { "offline" },
            "media_bucket": if bucket_healthy { "online" } else { "offline" },
            "telegram_service": if telegram_healthy { "online" } else { "offline" },
            "admin_api": if admin_configured { "online" } else { "offline" }
        },
        "timestamp": chrono::Utc::now().timestamp()
    }));
    Response::from_json(&response)
}
