// Traffic report properties: conservation of totals, deterministic
// ordering, idempotence, and the provider-ledger counting rules.

use club_portal::services::analytics::{build_traffic_report, TrafficReport};
use club_portal::types::{LavaPayment, ProdamusPayment, UserRecord};
use serde_json::json;

fn user(id: &str, utm: [&str; 5], registered: bool, all_payments: &str) -> UserRecord {
    let opt = |s: &str| {
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    };
    UserRecord {
        utm_1: opt(utm[0]),
        utm_2: opt(utm[1]),
        utm_3: opt(utm[2]),
        utm_4: opt(utm[3]),
        utm_5: opt(utm[4]),
        registered,
        all_payments: all_payments.to_string(),
        ..UserRecord::new(id)
    }
}

fn prodamus(user_id: &str, sum: &str, status: &str) -> ProdamusPayment {
    ProdamusPayment {
        id: format!("pp-{}-{}", user_id, sum),
        user_id: user_id.to_string(),
        payload: json!({ "sum": sum, "payment_status": status }),
        created_at: 0,
    }
}

fn lava(user_id: &str, amount: f64, status: &str) -> LavaPayment {
    LavaPayment {
        id: format!("lp-{}", user_id),
        user_id: user_id.to_string(),
        amount,
        status: status.to_string(),
        created_at: 0,
    }
}

fn sample_input() -> (Vec<UserRecord>, Vec<ProdamusPayment>, Vec<LavaPayment>) {
    let users = vec![
        user("1", ["fb", "cpc", "", "", ""], true, "50"),
        user("2", ["fb", "cpc", "", "", ""], false, "0"),
        user("3", ["insta", "", "", "", ""], true, "120"),
        user("4", ["", "", "", "", ""], false, "0"),
        user("5", ["fb", "stories", "", "", ""], true, "10"),
    ];
    let prodamus_payments = vec![
        prodamus("1", "100", "success"),
        prodamus("1", "50", "success"),
        prodamus("3", "200", "success"),
        prodamus("3", "0", "success"),
        prodamus("2", "80", "pending"),
    ];
    let lava_payments = vec![
        lava("5", 30.0, "subscription-success"),
        lava("4", 99.0, "failed"),
    ];
    (users, prodamus_payments, lava_payments)
}

fn assert_conservation(report: &TrafficReport) {
    let mut total_users = 0;
    let mut registered = 0;
    let mut paying_users = 0;
    let mut total_revenue = 0.0;
    let mut prodamus_users = 0;
    let mut prodamus_revenue = 0.0;
    let mut lava_users = 0;
    let mut lava_revenue = 0.0;

    for row in &report.rows {
        total_users += row.total_users;
        registered += row.registered;
        paying_users += row.paying_users;
        total_revenue += row.total_revenue;
        prodamus_users += row.prodamus_users;
        prodamus_revenue += row.prodamus_revenue;
        lava_users += row.lava_users;
        lava_revenue += row.lava_revenue;
    }

    assert_eq!(report.totals.total_users, total_users);
    assert_eq!(report.totals.registered, registered);
    assert_eq!(report.totals.paying_users, paying_users);
    assert!((report.totals.total_revenue - total_revenue).abs() < 1e-9);
    assert_eq!(report.totals.prodamus_users, prodamus_users);
    assert!((report.totals.prodamus_revenue - prodamus_revenue).abs() < 1e-9);
    assert_eq!(report.totals.lava_users, lava_users);
    assert!((report.totals.lava_revenue - lava_revenue).abs() < 1e-9);
}

#[test]
fn totals_equal_sum_of_rows() {
    let (users, prodamus_payments, lava_payments) = sample_input();
    let report = build_traffic_report(&users, &prodamus_payments, &lava_payments);

    assert_conservation(&report);
    assert_eq!(report.totals.total_users, 5);
    assert_eq!(report.totals.registered, 3);
}

#[test]
fn rows_are_sorted_with_empty_first() {
    let (users, prodamus_payments, lava_payments) = sample_input();
    let report = build_traffic_report(&users, &prodamus_payments, &lava_payments);

    for pair in report.rows.windows(2) {
        let a = (
            &pair[0].utm_1,
            &pair[0].utm_2,
            &pair[0].utm_3,
            &pair[0].utm_4,
            &pair[0].utm_5,
        );
        let b = (
            &pair[1].utm_1,
            &pair[1].utm_2,
            &pair[1].utm_3,
            &pair[1].utm_4,
            &pair[1].utm_5,
        );
        assert!(a <= b, "rows out of order: {:?} > {:?}", a, b);
    }

    // The all-empty tuple is the first row of this input set.
    assert_eq!(report.rows[0].utm_1, "");
    assert_eq!(report.rows[0].utm_2, "");
}

#[test]
fn rerunning_on_frozen_input_is_byte_identical() {
    let (users, prodamus_payments, lava_payments) = sample_input();

    let first = build_traffic_report(&users, &prodamus_payments, &lava_payments);
    let second = build_traffic_report(&users, &prodamus_payments, &lava_payments);

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn provider_users_count_subjects_not_payments() {
    // User 1 has two successful Prodamus payments: one provider user,
    // full accumulated revenue.
    let (users, prodamus_payments, lava_payments) = sample_input();
    let report = build_traffic_report(&users, &prodamus_payments, &lava_payments);

    let row = report
        .rows
        .iter()
        .find(|r| r.utm_1 == "fb" && r.utm_2 == "cpc")
        .unwrap();
    assert_eq!(row.prodamus_users, 1);
    assert!((row.prodamus_revenue - 150.0).abs() < 1e-9);
}

#[test]
fn zero_or_missing_sum_never_counts() {
    let users = vec![user("1", ["fb", "", "", "", ""], true, "0")];
    let payments = vec![
        prodamus("1", "0", "success"),
        ProdamusPayment {
            id: "pp-missing".to_string(),
            user_id: "1".to_string(),
            payload: json!({ "payment_status": "success" }),
            created_at: 0,
        },
    ];

    let report = build_traffic_report(&users, &payments, &[]);
    let row = &report.rows[0];
    assert_eq!(row.prodamus_users, 0);
    assert_eq!(row.prodamus_revenue, 0.0);
    assert_eq!(report.totals.prodamus_revenue, 0.0);
}

#[test]
fn paying_and_free_users_share_a_row() {
    // Users = [{id:1, utm_1:"fb", all_payments:"50"},
    //          {id:2, utm_1:"fb", all_payments:"0"}], no provider payments.
    let users = vec![
        user("1", ["fb", "", "", "", ""], false, "50"),
        user("2", ["fb", "", "", "", ""], false, "0"),
    ];
    let report = build_traffic_report(&users, &[], &[]);

    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.utm_1, "fb");
    assert_eq!(row.utm_2, "");
    assert_eq!(row.total_users, 2);
    assert_eq!(row.paying_users, 1);
    assert!((row.total_revenue - 50.0).abs() < 1e-9);
}

#[test]
fn identical_empty_tuples_aggregate_into_one_row() {
    let users = vec![
        user("1", ["", "", "", "", ""], false, "0"),
        user("2", ["", "", "", "", ""], false, "0"),
    ];
    let report = build_traffic_report(&users, &[], &[]);

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].total_users, 2);
}

#[test]
fn orphan_provider_payment_never_surfaces() {
    // A successful payment for a subject absent from the user set is
    // indexed but drives no row and no totals.
    let users = vec![user("1", ["fb", "", "", "", ""], false, "0")];
    let payments = vec![prodamus("999", "500", "success")];

    let report = build_traffic_report(&users, &payments, &[]);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.totals.prodamus_users, 0);
    assert_eq!(report.totals.prodamus_revenue, 0.0);
}

#[test]
fn sources_are_distinct_non_empty_and_sorted() {
    let (users, prodamus_payments, lava_payments) = sample_input();
    let report = build_traffic_report(&users, &prodamus_payments, &lava_payments);

    assert_eq!(report.sources, vec!["fb".to_string(), "insta".to_string()]);

    // Regardless of how many rows share a utm_1 value.
    assert!(report.rows.iter().filter(|r| r.utm_1 == "fb").count() > 1);
}

#[test]
fn three_revenue_sources_stay_independent() {
    // Self-reported revenue and provider-ledger revenue are tracked in
    // parallel without reconciliation.
    let users = vec![user("1", ["fb", "", "", "", ""], true, "500")];
    let prodamus_payments = vec![prodamus("1", "100", "success")];
    let lava_payments = vec![lava("1", 30.0, "payment success")];

    let report = build_traffic_report(&users, &prodamus_payments, &lava_payments);
    let row = &report.rows[0];
    assert!((row.total_revenue - 500.0).abs() < 1e-9);
    assert!((row.prodamus_revenue - 100.0).abs() < 1e-9);
    assert!((row.lava_revenue - 30.0).abs() < 1e-9);
    assert_eq!(row.paying_users, 1);
    assert_eq!(row.prodamus_users, 1);
    assert_eq!(row.lava_users, 1);
}
