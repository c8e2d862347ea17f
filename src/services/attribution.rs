// src/services/attribution.rs

//! Deep-link attribution parsing. Acquisition links open the Mini App with
//! a `start_param` like `utm1_fb__utm2_cpc__utm3_spring`; the tags are
//! written onto the user row once, at first registration, and never
//! overwritten by later visits.

use crate::types::UserRecord;

/// Separator between tag segments inside a start param.
const SEGMENT_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtmTags {
    pub utm_1: Option<String>,
    pub utm_2: Option<String>,
    pub utm_3: Option<String>,
    pub utm_4: Option<String>,
    pub utm_5: Option<String>,
}

impl UtmTags {
    pub fn is_empty(&self) -> bool {
        self.utm_1.is_none()
            && self.utm_2.is_none()
            && self.utm_3.is_none()
            && self.utm_4.is_none()
            && self.utm_5.is_none()
    }

    /// Writes the tags onto a user row. Only called for fresh registrations;
    /// attribution is first-touch.
    pub fn apply_to_user(&self, user: &mut UserRecord) {
        user.utm_1 = self.utm_1.clone();
        user.utm_2 = self.utm_2.clone();
        user.utm_3 = self.utm_3.clone();
        user.utm_4 = self.utm_4.clone();
        user.utm_5 = self.utm_5.clone();
    }
}

/// Parses attribution tags out of a deep-link start param. Segments that
/// do not look like `utm<1-5>_<value>` are ignored; a missing or empty
/// param yields no tags at all.
pub fn parse_start_param(start_param: Option<&str>) -> UtmTags {
    let mut tags = UtmTags::default();
    let raw = match start_param {
        Some(raw) if !raw.trim().is_empty() => raw.trim(),
        _ => return tags,
    };

    for segment in raw.split(SEGMENT_SEPARATOR) {
        let Some((slot, value)) = segment.split_once('_') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        let value = Some(value.to_string());
        match slot {
            "utm1" => tags.utm_1 = value,
            "utm2" => tags.utm_2 = value,
            "utm3" => tags.utm_3 = value,
            "utm4" => tags.utm_4 = value,
            "utm5" => tags.utm_5 = value,
            _ => {}
        }
    }

    tags
}
