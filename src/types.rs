// src/types.rs

use serde::{Deserialize, Serialize};

use crate::utils::time::current_timestamp_ms;

/// Member row as stored in the `users` table. The five attribution tags are
/// kept nullable in storage; they collapse to empty strings only when a
/// grouping key is built (see `services::analytics`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub photo_url: Option<String>,
    pub utm_1: Option<String>,
    pub utm_2: Option<String>,
    pub utm_3: Option<String>,
    pub utm_4: Option<String>,
    pub utm_5: Option<String>,
    pub registered: bool,
    /// Self-reported cumulative payments, stored as text the way the
    /// acquisition flow writes it.
    pub all_payments: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = current_timestamp_ms();
        Self {
            user_id: user_id.into(),
            username: None,
            first_name: None,
            photo_url: None,
            utm_1: None,
            utm_2: None,
            utm_3: None,
            utm_4: None,
            utm_5: None,
            registered: false,
            all_payments: "0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Content library entry (articles, guides, recordings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub content_url: String,
    pub cover_url: Option<String>,
    pub sort_order: i64,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Community event (online or offline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub starts_at: i64,
    pub location: Option<String>,
    pub link: Option<String>,
    pub cover_url: Option<String>,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqItem {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub sort_order: i64,
    pub published: bool,
}

/// Member review; submissions land unapproved and surface only after
/// moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub author_name: String,
    pub text: String,
    pub rating: i64,
    pub approved: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: String,
    pub material_id: String,
    pub created_at: i64,
}

/// Course available through the portal. `product_codes` lists the payment
/// product codes that grant access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub product_codes: Vec<String>,
    pub sort_order: i64,
    pub published: bool,
}

/// Provider-A (Prodamus) callback row. The payload is stored verbatim — it
/// may be a JSON object, a JSON-encoded string, or a double-encoded string;
/// decoding is deferred to the payment normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProdamusPayment {
    pub id: String,
    pub user_id: String,
    pub payload: serde_json::Value,
    pub created_at: i64,
}

/// Provider-B (Lava) callback row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LavaPayment {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub status: String,
    pub created_at: i64,
}

/// Identity parsed out of validated Mini-App init data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

// ============================================================================
// REQUEST BODIES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReviewRequest {
    pub text: String,
    pub rating: i64,
    #[serde(default)]
    pub author_name: Option<String>,
}

impl SubmitReviewRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("Review text must not be empty".to_string());
        }
        if self.text.len() > 4000 {
            return Err("Review text is too long".to_string());
        }
        if !(1..=5).contains(&self.rating) {
            return Err(format!("Rating must be between 1 and 5, got {}", self.rating));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.first_name {
            if name.trim().is_empty() {
                return Err("first_name must not be blank".to_string());
            }
            if name.len() > 256 {
                return Err("first_name is too long".to_string());
            }
        }
        Ok(())
    }

    pub fn apply_to_user(&self, user: &mut UserRecord) {
        if let Some(name) = &self.first_name {
            user.first_name = Some(name.trim().to_string());
        }
        if let Some(url) = &self.photo_url {
            user.photo_url = Some(url.clone());
        }
        user.updated_at = current_timestamp_ms();
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertMaterialRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub content_url: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub published: bool,
}

impl UpsertMaterialRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Material title must not be empty".to_string());
        }
        if self.content_url.trim().is_empty() {
            return Err("Material content_url must not be empty".to_string());
        }
        Ok(())
    }

    pub fn into_material(self, id: String) -> Material {
        let now = current_timestamp_ms();
        Material {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            content_url: self.content_url,
            cover_url: self.cover_url,
            sort_order: self.sort_order,
            published: self.published,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertEventRequest {
    pub title: String,
    pub description: String,
    pub starts_at: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default = "default_true")]
    pub published: bool,
}

impl UpsertEventRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Event title must not be empty".to_string());
        }
        if self.starts_at <= 0 {
            return Err("Event starts_at must be a unix-ms timestamp".to_string());
        }
        Ok(())
    }

    pub fn into_event(self, id: String) -> Event {
        let now = current_timestamp_ms();
        Event {
            id,
            title: self.title,
            description: self.description,
            starts_at: self.starts_at,
            location: self.location,
            link: self.link,
            cover_url: self.cover_url,
            published: self.published,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertFaqRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub published: bool,
}

impl UpsertFaqRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() || self.answer.trim().is_empty() {
            return Err("FAQ question and answer must not be empty".to_string());
        }
        Ok(())
    }

    pub fn into_faq_item(self, id: String) -> FaqItem {
        FaqItem {
            id,
            question: self.question,
            answer: self.answer,
            sort_order: self.sort_order,
            published: self.published,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertCourseRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub product_codes: Vec<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub published: bool,
}

impl UpsertCourseRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Course title must not be empty".to_string());
        }
        if self.product_codes.iter().any(|c| c.trim().is_empty()) {
            return Err("Course product_codes must not contain blanks".to_string());
        }
        Ok(())
    }

    pub fn into_course(self, id: String) -> Course {
        Course {
            id,
            title: self.title,
            description: self.description,
            product_codes: self.product_codes,
            sort_order: self.sort_order,
            published: self.published,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddFavoriteRequest {
    pub material_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaUploadRequest {
    pub filename: String,
    pub content_type: String,
    /// Base64-encoded file body.
    pub data: String,
}

impl MediaUploadRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.filename.trim().is_empty() {
            return Err("filename must not be empty".to_string());
        }
        if self.filename.contains("..") || self.filename.contains('/') {
            return Err("filename must not contain path separators".to_string());
        }
        if self.data.is_empty() {
            return Err("data must not be empty".to_string());
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
