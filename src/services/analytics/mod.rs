// src/services/analytics/mod.rs

//! Request-scoped report computations over rows fetched from the store.
//! Everything here is a pure fold: no suspension points, no state shared
//! across requests.

pub mod onboarding;
pub mod payments;
pub mod traffic;

pub use onboarding::{build_onboarding_report, OnboardingReport};
pub use payments::{
    build_revenue_index, decode_prodamus_payload, normalize_payment, NormalizedPayment,
    PaymentSource,
};
pub use traffic::{
    build_traffic_report, AttributionKey, TrafficReport, TrafficRow, TrafficTotals,
};
