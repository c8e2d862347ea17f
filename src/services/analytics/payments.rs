// src/services/analytics/payments.rs

//! Payment normalization for the two payment-provider integrations.
//!
//! Both providers report callbacks with their own schema; everything past
//! this module works with one canonical `(subject, amount, successful)`
//! triple per record.

use std::collections::HashMap;

use serde_json::Value;

use crate::log_warn;
use crate::types::{LavaPayment, ProdamusPayment};
use crate::utils::helpers::safe_parse_float;

/// Literal status Prodamus reports for a completed payment.
const PRODAMUS_SUCCESS_STATUS: &str = "success";
/// Lava uses compound statuses ("subscription-success", "payment success"),
/// so a substring match is required.
const LAVA_SUCCESS_MARKER: &str = "success";

/// Canonical view of one payment record, provider differences erased.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPayment {
    pub subject_id: String,
    pub amount: f64,
    pub successful: bool,
}

/// One raw payment record from either provider.
pub enum PaymentSource<'a> {
    Prodamus(&'a ProdamusPayment),
    Lava(&'a LavaPayment),
}

pub fn normalize_payment(source: PaymentSource<'_>) -> NormalizedPayment {
    match source {
        PaymentSource::Prodamus(record) => normalize_prodamus(record),
        PaymentSource::Lava(record) => normalize_lava(record),
    }
}

fn normalize_prodamus(record: &ProdamusPayment) -> NormalizedPayment {
    let payload = match decode_prodamus_payload(&record.payload) {
        Some(payload) => payload,
        None => {
            log_warn!(
                "Malformed Prodamus payload, counting as unsuccessful",
                serde_json::json!({ "payment_id": record.id, "user_id": record.user_id })
            );
            return NormalizedPayment {
                subject_id: record.user_id.clone(),
                amount: 0.0,
                successful: false,
            };
        }
    };

    let amount = safe_parse_float(payload.get("sum").unwrap_or(&Value::Null), 0.0);
    let status = payload
        .get("payment_status")
        .and_then(Value::as_str)
        .unwrap_or("");

    NormalizedPayment {
        subject_id: record.user_id.clone(),
        amount,
        successful: amount > 0.0 && status == PRODAMUS_SUCCESS_STATUS,
    }
}

fn normalize_lava(record: &LavaPayment) -> NormalizedPayment {
    NormalizedPayment {
        subject_id: record.user_id.clone(),
        amount: record.amount,
        successful: record.amount > 0.0 && record.status.contains(LAVA_SUCCESS_MARKER),
    }
}

/// Resolves a Prodamus payload to its object form. The callback body may
/// arrive as a JSON object, a JSON-encoded string, or a double-encoded
/// string; decode at most twice and give up on anything else.
pub fn decode_prodamus_payload(raw: &Value) -> Option<Value> {
    match raw {
        Value::Object(_) => Some(raw.clone()),
        Value::String(encoded) => {
            let once: Value = serde_json::from_str(encoded).ok()?;
            match once {
                Value::String(inner) => serde_json::from_str(&inner).ok(),
                Value::Object(_) => Some(once),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Folds normalized payments into a per-subject revenue index. Only
/// successful entries with a positive amount count; amounts for the same
/// subject accumulate. Subjects missing from the index earned nothing
/// through that provider.
pub fn build_revenue_index<I>(payments: I) -> HashMap<String, f64>
where
    I: IntoIterator<Item = NormalizedPayment>,
{
    let mut index: HashMap<String, f64> = HashMap::new();
    for payment in payments {
        if !payment.successful || payment.amount <= 0.0 || payment.subject_id.is_empty() {
            continue;
        }
        *index.entry(payment.subject_id).or_insert(0.0) += payment.amount;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prodamus(user_id: &str, payload: Value) -> ProdamusPayment {
        ProdamusPayment {
            id: "p1".to_string(),
            user_id: user_id.to_string(),
            payload,
            created_at: 0,
        }
    }

    #[test]
    fn test_prodamus_object_payload() {
        let record = prodamus("1", json!({"sum": "100", "payment_status": "success"}));
        let normalized = normalize_payment(PaymentSource::Prodamus(&record));
        assert_eq!(normalized.amount, 100.0);
        assert!(normalized.successful);
    }

    #[test]
    fn test_prodamus_single_encoded_payload() {
        let encoded = json!({"sum": "250.5", "payment_status": "success"}).to_string();
        let record = prodamus("1", Value::String(encoded));
        let normalized = normalize_payment(PaymentSource::Prodamus(&record));
        assert_eq!(normalized.amount, 250.5);
        assert!(normalized.successful);
    }

    #[test]
    fn test_prodamus_double_encoded_payload() {
        let inner = json!({"sum": "99", "payment_status": "success"}).to_string();
        let outer = serde_json::to_string(&inner).unwrap();
        let record = prodamus("1", serde_json::from_str(&outer).unwrap());
        let normalized = normalize_payment(PaymentSource::Prodamus(&record));
        assert_eq!(normalized.amount, 99.0);
        assert!(normalized.successful);
    }

    #[test]
    fn test_prodamus_garbage_payload_is_unsuccessful() {
        let record = prodamus("1", Value::String("{not json".to_string()));
        let normalized = normalize_payment(PaymentSource::Prodamus(&record));
        assert_eq!(normalized.amount, 0.0);
        assert!(!normalized.successful);
    }

    #[test]
    fn test_prodamus_zero_or_missing_sum_never_counts() {
        let zero = prodamus("1", json!({"sum": "0", "payment_status": "success"}));
        assert!(!normalize_payment(PaymentSource::Prodamus(&zero)).successful);

        let missing = prodamus("1", json!({"payment_status": "success"}));
        assert!(!normalize_payment(PaymentSource::Prodamus(&missing)).successful);
    }

    #[test]
    fn test_prodamus_wrong_status_never_counts() {
        let record = prodamus("1", json!({"sum": "100", "payment_status": "pending"}));
        assert!(!normalize_payment(PaymentSource::Prodamus(&record)).successful);
    }

    #[test]
    fn test_lava_compound_status() {
        let record = LavaPayment {
            id: "l1".to_string(),
            user_id: "2".to_string(),
            amount: 42.0,
            status: "subscription-success".to_string(),
            created_at: 0,
        };
        let normalized = normalize_payment(PaymentSource::Lava(&record));
        assert!(normalized.successful);
        assert_eq!(normalized.amount, 42.0);

        let failed = LavaPayment {
            status: "subscription-failed".to_string(),
            ..record
        };
        assert!(!normalize_payment(PaymentSource::Lava(&failed)).successful);
    }

    #[test]
    fn test_revenue_index_accumulates_per_subject() {
        let payments = vec![
            NormalizedPayment {
                subject_id: "1".to_string(),
                amount: 100.0,
                successful: true,
            },
            NormalizedPayment {
                subject_id: "1".to_string(),
                amount: 50.0,
                successful: true,
            },
            NormalizedPayment {
                subject_id: "2".to_string(),
                amount: 10.0,
                successful: false,
            },
            NormalizedPayment {
                subject_id: String::new(),
                amount: 30.0,
                successful: true,
            },
        ];

        let index = build_revenue_index(payments);
        assert_eq!(index.get("1"), Some(&150.0));
        assert_eq!(index.get("2"), None);
        assert_eq!(index.get(""), None);
    }
}
