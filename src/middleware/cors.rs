// src/middleware/cors.rs

use worker::{Response, Result};

/// Add CORS headers to a response
pub fn add_cors_headers(mut response: Response) -> Result<Response> {
    let headers = response.headers_mut();

    headers.set("Access-Control-Allow-Origin", "*")?;
    headers.set(
        "Access-Control-Allow-Methods",
        "GET, POST, PUT, DELETE, OPTIONS",
    )?;
    headers.set(
        "Access-Control-Allow-Headers",
        "Content-Type, X-Telegram-Init-Data, X-Admin-Token",
    )?;
    headers.set("Access-Control-Max-Age", "86400")?;

    Ok(response)
}
