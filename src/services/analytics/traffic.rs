// src/services/analytics/traffic.rs

//! Traffic-attribution report: folds the user set into per-UTM-tuple rows
//! with registration, payment, and per-provider revenue counters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{LavaPayment, ProdamusPayment, UserRecord};
use crate::utils::helpers::safe_parse_float_str;

use super::payments::{build_revenue_index, normalize_payment, PaymentSource};

/// Grouping key: the five attribution tags with absent slots collapsed to
/// empty strings. The derived `Ord` is exactly the report ordering —
/// field-by-field lexicographic with the empty string first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributionKey {
    pub utm_1: String,
    pub utm_2: String,
    pub utm_3: String,
    pub utm_4: String,
    pub utm_5: String,
}

impl AttributionKey {
    pub fn from_user(user: &UserRecord) -> Self {
        fn tag(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }

        Self {
            utm_1: tag(&user.utm_1),
            utm_2: tag(&user.utm_2),
            utm_3: tag(&user.utm_3),
            utm_4: tag(&user.utm_4),
            utm_5: tag(&user.utm_5),
        }
    }
}

/// One aggregated report row. Created zeroed on first sight of its key and
/// mutated as users fold in; lives only for the duration of one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRow {
    pub utm_1: String,
    pub utm_2: String,
    pub utm_3: String,
    pub utm_4: String,
    pub utm_5: String,
    pub total_users: u64,
    pub registered: u64,
    pub paying_users: u64,
    pub total_revenue: f64,
    pub prodamus_users: u64,
    pub prodamus_revenue: f64,
    pub lava_users: u64,
    pub lava_revenue: f64,
}

impl TrafficRow {
    fn zeroed(key: &AttributionKey) -> Self {
        Self {
            utm_1: key.utm_1.clone(),
            utm_2: key.utm_2.clone(),
            utm_3: key.utm_3.clone(),
            utm_4: key.utm_4.clone(),
            utm_5: key.utm_5.clone(),
            total_users: 0,
            registered: 0,
            paying_users: 0,
            total_revenue: 0.0,
            prodamus_users: 0,
            prodamus_revenue: 0.0,
            lava_users: 0,
            lava_revenue: 0.0,
        }
    }
}

/// Grand totals across every row of the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficTotals {
    pub total_users: u64,
    pub registered: u64,
    pub paying_users: u64,
    pub total_revenue: f64,
    pub prodamus_users: u64,
    pub prodamus_revenue: f64,
    pub lava_users: u64,
    pub lava_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficReport {
    pub rows: Vec<TrafficRow>,
    pub totals: TrafficTotals,
    /// Distinct non-empty utm_1 values seen in the raw user set, sorted.
    pub sources: Vec<String>,
}

/// Builds the full traffic report from the three fetched record sets.
pub fn build_traffic_report(
    users: &[UserRecord],
    prodamus_payments: &[ProdamusPayment],
    lava_payments: &[LavaPayment],
) -> TrafficReport {
    let prodamus_index = build_revenue_index(
        prodamus_payments
            .iter()
            .map(|p| normalize_payment(PaymentSource::Prodamus(p))),
    );
    let lava_index = build_revenue_index(
        lava_payments
            .iter()
            .map(|p| normalize_payment(PaymentSource::Lava(p))),
    );

    let grouped = aggregate_by_attribution(users, &prodamus_index, &lava_index);
    assemble_report(users, grouped)
}

/// Folds the user set into a per-key row map. Every user lands in exactly
/// one group; a user with an empty subject id still groups, it just can
/// never match a provider ledger entry.
pub fn aggregate_by_attribution(
    users: &[UserRecord],
    prodamus_index: &HashMap<String, f64>,
    lava_index: &HashMap<String, f64>,
) -> HashMap<AttributionKey, TrafficRow> {
    let mut grouped: HashMap<AttributionKey, TrafficRow> = HashMap::new();

    for user in users {
        let key = AttributionKey::from_user(user);
        let row = grouped
            .entry(key)
            .or_insert_with_key(|key| TrafficRow::zeroed(key));

        row.total_users += 1;
        if user.registered {
            row.registered += 1;
        }

        // The user's own cumulative figure and the two provider ledgers are
        // three independent revenue sources; none overrides another.
        let own_payments = safe_parse_float_str(&user.all_payments, 0.0);
        if own_payments > 0.0 {
            row.paying_users += 1;
            row.total_revenue += own_payments;
        }

        if let Some(revenue) = prodamus_index.get(&user.user_id) {
            if *revenue > 0.0 {
                row.prodamus_users += 1;
                row.prodamus_revenue += revenue;
            }
        }

        if let Some(revenue) = lava_index.get(&user.user_id) {
            if *revenue > 0.0 {
                row.lava_users += 1;
                row.lava_revenue += revenue;
            }
        }
    }

    grouped
}

/// Orders the rows, computes grand totals, and collects the utm_1 filter
/// sources from the raw input (not the aggregated rows).
pub fn assemble_report(
    users: &[UserRecord],
    grouped: HashMap<AttributionKey, TrafficRow>,
) -> TrafficReport {
    let mut entries: Vec<(AttributionKey, TrafficRow)> = grouped.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    let rows: Vec<TrafficRow> = entries.into_iter().map(|(_, row)| row).collect();

    let mut totals = TrafficTotals::default();
    for row in &rows {
        totals.total_users += row.total_users;
        totals.registered += row.registered;
        totals.paying_users += row.paying_users;
        totals.total_revenue += row.total_revenue;
        totals.prodamus_users += row.prodamus_users;
        totals.prodamus_revenue += row.prodamus_revenue;
        totals.lava_users += row.lava_users;
        totals.lava_revenue += row.lava_revenue;
    }

    let mut sources: Vec<String> = users
        .iter()
        .filter_map(|user| user.utm_1.clone())
        .filter(|tag| !tag.is_empty())
        .collect();
    sources.sort();
    sources.dedup();

    TrafficReport {
        rows,
        totals,
        sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, utm_1: Option<&str>, all_payments: &str) -> UserRecord {
        UserRecord {
            utm_1: utm_1.map(str::to_string),
            all_payments: all_payments.to_string(),
            ..UserRecord::new(id)
        }
    }

    #[test]
    fn test_attribution_key_empty_sorts_first() {
        let empty = AttributionKey {
            utm_1: String::new(),
            utm_2: String::new(),
            utm_3: String::new(),
            utm_4: String::new(),
            utm_5: String::new(),
        };
        let tagged = AttributionKey {
            utm_1: "a".to_string(),
            utm_2: String::new(),
            utm_3: String::new(),
            utm_4: String::new(),
            utm_5: String::new(),
        };
        assert!(empty < tagged);
    }

    #[test]
    fn test_single_group_with_paying_and_free_user() {
        let users = vec![user("1", Some("fb"), "50"), user("2", Some("fb"), "0")];
        let report = build_traffic_report(&users, &[], &[]);

        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.utm_1, "fb");
        assert_eq!(row.total_users, 2);
        assert_eq!(row.paying_users, 1);
        assert_eq!(row.total_revenue, 50.0);
        assert_eq!(report.sources, vec!["fb".to_string()]);
    }

    #[test]
    fn test_all_empty_tuples_share_one_row() {
        let users = vec![user("1", None, "0"), user("2", None, "0")];
        let report = build_traffic_report(&users, &[], &[]);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].total_users, 2);
        assert!(report.sources.is_empty());
    }

    #[test]
    fn test_empty_subject_id_never_matches_provider_ledger() {
        let mut prodamus_index = HashMap::new();
        prodamus_index.insert("1".to_string(), 100.0);

        let users = vec![user("", Some("fb"), "0")];
        let grouped = aggregate_by_attribution(&users, &prodamus_index, &HashMap::new());
        let row = grouped.values().next().unwrap();
        assert_eq!(row.prodamus_users, 0);
        assert_eq!(row.prodamus_revenue, 0.0);
    }
}
