// Course-access mapping from successful provider payments.

use club_portal::services::course_access::{map_course_access, purchased_product_codes};
use club_portal::types::{Course, ProdamusPayment};
use serde_json::{json, Value};
use std::collections::HashSet;

fn course(id: &str, codes: &[&str]) -> Course {
    Course {
        id: id.to_string(),
        title: id.to_string(),
        description: String::new(),
        product_codes: codes.iter().map(|c| c.to_string()).collect(),
        sort_order: 0,
        published: true,
    }
}

fn payment(payload: Value) -> ProdamusPayment {
    ProdamusPayment {
        id: "p".to_string(),
        user_id: "42".to_string(),
        payload,
        created_at: 0,
    }
}

#[test]
fn products_array_grants_codes() {
    let payments = vec![payment(json!({
        "sum": "1500",
        "payment_status": "success",
        "products": [{"name": "base-course"}, {"name": "bonus-pack"}]
    }))];

    let codes = purchased_product_codes(&payments);
    assert_eq!(
        codes,
        HashSet::from(["base-course".to_string(), "bonus-pack".to_string()])
    );
}

#[test]
fn encoded_payload_still_grants_codes() {
    let encoded = json!({
        "sum": "900",
        "payment_status": "success",
        "products": [{"name": "pro-course"}]
    })
    .to_string();
    let payments = vec![payment(Value::String(encoded))];

    let codes = purchased_product_codes(&payments);
    assert!(codes.contains("pro-course"));
}

#[test]
fn failed_payments_grant_nothing() {
    let payments = vec![
        payment(json!({
            "sum": "0",
            "payment_status": "success",
            "products": [{"name": "free-attempt"}]
        })),
        payment(json!({
            "sum": "100",
            "payment_status": "refunded",
            "products": [{"name": "refunded-course"}]
        })),
    ];

    assert!(purchased_product_codes(&payments).is_empty());
}

#[test]
fn mapping_marks_open_owned_and_locked() {
    let mut purchased = HashSet::new();
    purchased.insert("base-course".to_string());

    let access = map_course_access(
        vec![
            course("open", &[]),
            course("owned", &["base-course", "legacy-code"]),
            course("locked", &["pro-course"]),
        ],
        &purchased,
    );

    let by_id: Vec<(&str, bool)> = access
        .iter()
        .map(|a| (a.course.id.as_str(), a.accessible))
        .collect();
    assert_eq!(
        by_id,
        vec![("open", true), ("owned", true), ("locked", false)]
    );
}
