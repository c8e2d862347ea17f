// src/services/analytics/onboarding.rs

//! Onboarding funnel report: a single pass over the user set in a date
//! window, counting how far members got through acquisition.

use serde::{Deserialize, Serialize};

use crate::types::UserRecord;
use crate::utils::helpers::safe_parse_float_str;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingReport {
    pub total_users: u64,
    pub registered: u64,
    /// Users carrying at least one attribution tag.
    pub attributed: u64,
    /// Users whose self-reported cumulative payments are positive.
    pub paying_users: u64,
    pub registration_rate: f64,
    pub paying_rate: f64,
}

pub fn build_onboarding_report(users: &[UserRecord]) -> OnboardingReport {
    let mut report = OnboardingReport::default();

    for user in users {
        report.total_users += 1;
        if user.registered {
            report.registered += 1;
        }

        let has_attribution = [
            &user.utm_1, &user.utm_2, &user.utm_3, &user.utm_4, &user.utm_5,
        ]
        .iter()
        .any(|tag| tag.as_deref().is_some_and(|t| !t.is_empty()));
        if has_attribution {
            report.attributed += 1;
        }

        if safe_parse_float_str(&user.all_payments, 0.0) > 0.0 {
            report.paying_users += 1;
        }
    }

    if report.total_users > 0 {
        let total = report.total_users as f64;
        report.registration_rate = report.registered as f64 / total;
        report.paying_rate = report.paying_users as f64 / total;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_zero_rates() {
        let report = build_onboarding_report(&[]);
        assert_eq!(report.total_users, 0);
        assert_eq!(report.registration_rate, 0.0);
    }

    #[test]
    fn test_funnel_counts() {
        let mut registered = UserRecord::new("1");
        registered.registered = true;
        registered.utm_1 = Some("fb".to_string());
        registered.all_payments = "10".to_string();

        let mut tagged_only = UserRecord::new("2");
        tagged_only.utm_3 = Some("retarget".to_string());

        let plain = UserRecord::new("3");

        let report = build_onboarding_report(&[registered, tagged_only, plain]);
        assert_eq!(report.total_users, 3);
        assert_eq!(report.registered, 1);
        assert_eq!(report.attributed, 2);
        assert_eq!(report.paying_users, 1);
        assert!((report.registration_rate - 1.0 / 3.0).abs() < 1e-9);
    }
}
