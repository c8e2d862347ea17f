// src/services/course_access.rs

//! Course-access mapping: a member can open a course when one of their
//! successful provider payments carries a product code the course lists.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::analytics::{decode_prodamus_payload, normalize_payment, PaymentSource};
use crate::types::{Course, ProdamusPayment};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseAccess {
    #[serde(flatten)]
    pub course: Course,
    pub accessible: bool,
}

/// Collects product codes from the member's successful provider-A payments.
/// Prodamus carries them in the payload `products` array; older callbacks
/// only have `order_num`.
pub fn purchased_product_codes(payments: &[ProdamusPayment]) -> HashSet<String> {
    let mut codes = HashSet::new();

    for payment in payments {
        if !normalize_payment(PaymentSource::Prodamus(payment)).successful {
            continue;
        }
        let payload = match decode_prodamus_payload(&payment.payload) {
            Some(payload) => payload,
            None => continue,
        };

        if let Some(products) = payload.get("products").and_then(Value::as_array) {
            for product in products {
                if let Some(name) = product.get("name").and_then(Value::as_str) {
                    let name = name.trim();
                    if !name.is_empty() {
                        codes.insert(name.to_string());
                    }
                }
            }
        }

        if let Some(order) = payload.get("order_num").and_then(Value::as_str) {
            let order = order.trim();
            if !order.is_empty() {
                codes.insert(order.to_string());
            }
        }
    }

    codes
}

/// Marks each published course with whether the given product codes unlock
/// it. Courses with no product codes are open to everyone.
pub fn map_course_access(courses: Vec<Course>, purchased: &HashSet<String>) -> Vec<CourseAccess> {
    courses
        .into_iter()
        .map(|course| {
            let accessible = course.product_codes.is_empty()
                || course
                    .product_codes
                    .iter()
                    .any(|code| purchased.contains(code));
            CourseAccess { course, accessible }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course(id: &str, codes: &[&str]) -> Course {
        Course {
            id: id.to_string(),
            title: format!("Course {}", id),
            description: String::new(),
            product_codes: codes.iter().map(|c| c.to_string()).collect(),
            sort_order: 0,
            published: true,
        }
    }

    fn paid(user_id: &str, payload: Value) -> ProdamusPayment {
        ProdamusPayment {
            id: "p".to_string(),
            user_id: user_id.to_string(),
            payload,
            created_at: 0,
        }
    }

    #[test]
    fn test_codes_come_only_from_successful_payments() {
        let payments = vec![
            paid(
                "1",
                json!({"sum": "100", "payment_status": "success",
                       "products": [{"name": "base-course"}]}),
            ),
            paid(
                "1",
                json!({"sum": "100", "payment_status": "pending",
                       "products": [{"name": "pro-course"}]}),
            ),
        ];

        let codes = purchased_product_codes(&payments);
        assert!(codes.contains("base-course"));
        assert!(!codes.contains("pro-course"));
    }

    #[test]
    fn test_order_num_fallback() {
        let payments = vec![paid(
            "1",
            json!({"sum": "10", "payment_status": "success", "order_num": "intensive-2024"}),
        )];
        let codes = purchased_product_codes(&payments);
        assert!(codes.contains("intensive-2024"));
    }

    #[test]
    fn test_access_mapping() {
        let mut purchased = HashSet::new();
        purchased.insert("base-course".to_string());

        let access = map_course_access(
            vec![
                course("open", &[]),
                course("owned", &["base-course"]),
                course("locked", &["pro-course"]),
            ],
            &purchased,
        );

        assert!(access[0].accessible);
        assert!(access[1].accessible);
        assert!(!access[2].accessible);
    }
}
