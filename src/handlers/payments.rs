use serde_json::Value;
use uuid::Uuid;
use worker::{Env, Request, Response, Result};

use crate::handlers::error_response;
use crate::responses::ApiResponse;
use crate::services::analytics::decode_prodamus_payload;
use crate::services::D1Service;
use crate::types::{LavaPayment, ProdamusPayment};
use crate::utils::helpers::safe_parse_float;
use crate::utils::time::current_timestamp_ms;
use crate::{log_info, log_warn};

/// Prodamus payment callback. The body is stored verbatim — object,
/// JSON-encoded string, or double-encoded string all land in the payload
/// column and are resolved later by the report normalizer. The provider
/// retries on non-2xx, so a stored callback always answers 200.
pub async fn handle_prodamus_callback(mut req: Request, env: Env) -> Result<Response> {
    let body = req.text().await?;

    let payload: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => {
            log_warn!(
                "Prodamus callback body is not JSON, storing raw text",
                serde_json::json!({ "length": body.len() })
            );
            Value::String(body)
        }
    };

    let user_id = extract_subject_id(&payload);
    if user_id.is_empty() {
        log_warn!("Prodamus callback carries no subject id");
    }

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let payment = ProdamusPayment {
        id: Uuid::new_v4().to_string(),
        user_id,
        payload,
        created_at: current_timestamp_ms(),
    };

    match db.insert_prodamus_payment(&payment).await {
        Ok(()) => {
            log_info!(
                "Stored Prodamus callback",
                serde_json::json!({ "payment_id": payment.id, "user_id": payment.user_id })
            );
            Response::from_json(&ApiResponse::success(serde_json::json!({
                "stored": true
            })))
        }
        Err(e) => error_response(&e),
    }
}

/// Lava payment callback: subject id, numeric amount, and compound status
/// are lifted into their own columns at write time.
pub async fn handle_lava_callback(mut req: Request, env: Env) -> Result<Response> {
    let payload: Value = match req.json().await {
        Ok(value) => value,
        Err(e) => {
            let response = ApiResponse::<()>::error(format!("Invalid JSON format: {}", e));
            return Ok(Response::from_json(&response)?.with_status(400));
        }
    };

    let user_id = extract_subject_id(&payload);
    let amount = safe_parse_float(payload.get("amount").unwrap_or(&Value::Null), 0.0);
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let db = match D1Service::new(&env) {
        Ok(db) => db,
        Err(e) => return error_response(&e),
    };

    let payment = LavaPayment {
        id: Uuid::new_v4().to_string(),
        user_id,
        amount,
        status,
        created_at: current_timestamp_ms(),
    };

    match db.insert_lava_payment(&payment).await {
        Ok(()) => {
            log_info!(
                "Stored Lava callback",
                serde_json::json!({ "payment_id": payment.id, "user_id": payment.user_id })
            );
            Response::from_json(&ApiResponse::success(serde_json::json!({
                "stored": true
            })))
        }
        Err(e) => error_response(&e),
    }
}

/// Pulls the subject id out of a callback payload. Prodamus nests it under
/// whatever encoding layer the callback used; Lava sends it flat.
fn extract_subject_id(payload: &Value) -> String {
    let decoded = decode_prodamus_payload(payload).unwrap_or_else(|| payload.clone());

    for field in ["user_id", "customer_extra", "buyer_id"] {
        match decoded.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_subject_id_flat() {
        assert_eq!(extract_subject_id(&json!({"user_id": "42"})), "42");
        assert_eq!(extract_subject_id(&json!({"user_id": 42})), "42");
    }

    #[test]
    fn test_extract_subject_id_from_encoded_payload() {
        let encoded = json!({"user_id": "77", "sum": "10"}).to_string();
        assert_eq!(extract_subject_id(&Value::String(encoded)), "77");
    }

    #[test]
    fn test_extract_subject_id_fallback_fields() {
        assert_eq!(extract_subject_id(&json!({"customer_extra": "99"})), "99");
        assert_eq!(extract_subject_id(&json!({"note": "x"})), "");
    }
}
