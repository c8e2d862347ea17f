// Payment normalizer edge cases across both provider schemas, plus the
// revenue-index fold.

use club_portal::services::analytics::{
    build_revenue_index, normalize_payment, NormalizedPayment, PaymentSource,
};
use club_portal::types::{LavaPayment, ProdamusPayment};
use serde_json::{json, Value};

fn prodamus(payload: Value) -> ProdamusPayment {
    ProdamusPayment {
        id: "p1".to_string(),
        user_id: "42".to_string(),
        payload,
        created_at: 0,
    }
}

fn lava(amount: f64, status: &str) -> LavaPayment {
    LavaPayment {
        id: "l1".to_string(),
        user_id: "42".to_string(),
        amount,
        status: status.to_string(),
        created_at: 0,
    }
}

#[test]
fn object_single_and_double_encoded_payloads_agree() {
    let object = prodamus(json!({"sum": "100", "payment_status": "success"}));

    let single = prodamus(Value::String(
        json!({"sum": "100", "payment_status": "success"}).to_string(),
    ));

    let inner = json!({"sum": "100", "payment_status": "success"}).to_string();
    let double = prodamus(serde_json::from_str(&serde_json::to_string(&inner).unwrap()).unwrap());

    let expected = NormalizedPayment {
        subject_id: "42".to_string(),
        amount: 100.0,
        successful: true,
    };
    assert_eq!(normalize_payment(PaymentSource::Prodamus(&object)), expected);
    assert_eq!(normalize_payment(PaymentSource::Prodamus(&single)), expected);
    assert_eq!(normalize_payment(PaymentSource::Prodamus(&double)), expected);
}

#[test]
fn undecodable_payload_is_zero_and_unsuccessful_not_fatal() {
    for payload in [
        Value::String("not json at all".to_string()),
        Value::String("\"still a string after one decode\"".to_string()),
        json!(12345),
        Value::Null,
    ] {
        let record = prodamus(payload);
        let normalized = normalize_payment(PaymentSource::Prodamus(&record));
        assert_eq!(normalized.amount, 0.0);
        assert!(!normalized.successful);
    }
}

#[test]
fn unparseable_sum_defaults_to_zero() {
    let record = prodamus(json!({"sum": "12,50", "payment_status": "success"}));
    let normalized = normalize_payment(PaymentSource::Prodamus(&record));
    assert_eq!(normalized.amount, 0.0);
    assert!(!normalized.successful);
}

#[test]
fn prodamus_status_must_match_exactly() {
    for status in ["Success", "success-pending", "SUCCESS", ""] {
        let record = prodamus(json!({"sum": "10", "payment_status": status}));
        assert!(
            !normalize_payment(PaymentSource::Prodamus(&record)).successful,
            "status {:?} must not count",
            status
        );
    }
}

#[test]
fn lava_status_is_substring_matched() {
    assert!(normalize_payment(PaymentSource::Lava(&lava(5.0, "subscription-success"))).successful);
    assert!(normalize_payment(PaymentSource::Lava(&lava(5.0, "payment success one-time"))).successful);
    assert!(!normalize_payment(PaymentSource::Lava(&lava(5.0, "cancelled"))).successful);
    assert!(!normalize_payment(PaymentSource::Lava(&lava(0.0, "subscription-success"))).successful);
    assert!(!normalize_payment(PaymentSource::Lava(&lava(-3.0, "subscription-success"))).successful);
}

#[test]
fn revenue_index_is_order_independent() {
    let forward = vec![
        NormalizedPayment {
            subject_id: "1".to_string(),
            amount: 10.0,
            successful: true,
        },
        NormalizedPayment {
            subject_id: "2".to_string(),
            amount: 20.0,
            successful: true,
        },
        NormalizedPayment {
            subject_id: "1".to_string(),
            amount: 5.0,
            successful: true,
        },
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = build_revenue_index(forward);
    let b = build_revenue_index(reversed);
    assert_eq!(a, b);
    assert_eq!(a.get("1"), Some(&15.0));
}
