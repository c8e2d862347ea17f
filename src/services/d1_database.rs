// src/services/d1_database.rs

//! D1Service provides database operations using Cloudflare D1.
//! All portal content (users, materials, events, FAQ, reviews, favorites,
//! courses) and the raw payment-callback rows live here; every fetch fully
//! materializes its result set.

use std::collections::HashMap;

use serde_json::Value;
use worker::{D1Database, Env};

use crate::types::{
    Course, Event, FaqItem, Favorite, LavaPayment, Material, ProdamusPayment, Review, UserRecord,
};
use crate::utils::helpers::{
    value_to_bool, value_to_f64, value_to_i64, value_to_opt_string, value_to_string,
};
use crate::utils::{PortalError, PortalResult};

const DATABASE_BINDING: &str = "PortalDB";

/// Upper bound used when a range filter has no explicit end
/// (9999-12-31T23:59:59.999Z).
const MAX_TIMESTAMP_MS: i64 = 253_402_300_799_999;

pub struct D1Service {
    db: D1Database,
}

impl D1Service {
    pub fn new(env: &Env) -> PortalResult<Self> {
        let db = env
            .d1(DATABASE_BINDING)
            .map_err(|e| PortalError::config_error(format!("Missing D1 binding: {:?}", e)))?;
        Ok(D1Service { db })
    }

    // ============= USER OPERATIONS =============

    pub async fn upsert_user(&self, user: &UserRecord) -> PortalResult<()> {
        let stmt = self.db.prepare(
            "INSERT OR REPLACE INTO users (
                user_id, username, first_name, photo_url,
                utm_1, utm_2, utm_3, utm_4, utm_5,
                registered, all_payments, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        );

        stmt.bind(&[
            user.user_id.clone().into(),
            user.username.clone().unwrap_or_default().into(),
            user.first_name.clone().unwrap_or_default().into(),
            user.photo_url.clone().unwrap_or_default().into(),
            user.utm_1.clone().unwrap_or_default().into(),
            user.utm_2.clone().unwrap_or_default().into(),
            user.utm_3.clone().unwrap_or_default().into(),
            user.utm_4.clone().unwrap_or_default().into(),
            user.utm_5.clone().unwrap_or_default().into(),
            user.registered.into(),
            user.all_payments.clone().into(),
            (user.created_at as f64).into(),
            (user.updated_at as f64).into(),
        ])
        .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
        .run()
        .await
        .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> PortalResult<Option<UserRecord>> {
        let stmt = self.db.prepare("SELECT * FROM users WHERE user_id = ?");

        let result = stmt
            .bind(&[user_id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<HashMap<String, Value>>(None)
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(result.map(row_to_user))
    }

    pub async fn list_users(
        &self,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> PortalResult<Vec<UserRecord>> {
        let limit = limit.unwrap_or(50);
        let offset = offset.unwrap_or(0);

        let stmt = self.db.prepare(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?",
        );

        let result = stmt
            .bind(&[limit.into(), offset.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    /// Users created inside the inclusive window; absent bounds are open.
    pub async fn list_users_created_between(
        &self,
        from: Option<i64>,
        to: Option<i64>,
    ) -> PortalResult<Vec<UserRecord>> {
        let stmt = self.db.prepare(
            "SELECT * FROM users WHERE created_at >= ? AND created_at <= ? ORDER BY created_at ASC",
        );

        let result = stmt
            .bind(&[
                (from.unwrap_or(0) as f64).into(),
                (to.unwrap_or(MAX_TIMESTAMP_MS) as f64).into(),
            ])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    // ============= MATERIAL OPERATIONS =============

    pub async fn list_materials(
        &self,
        published_only: bool,
        category: Option<&str>,
    ) -> PortalResult<Vec<Material>> {
        // Category is an exact-match filter; NULL pattern keeps one statement
        // for both shapes.
        let stmt = self.db.prepare(
            "SELECT * FROM materials
             WHERE (? = 0 OR published = 1) AND (? IS NULL OR category = ?)
             ORDER BY sort_order ASC, created_at DESC",
        );

        let category_value: Value = match category {
            Some(c) => Value::String(c.to_string()),
            None => Value::Null,
        };
        let result = stmt
            .bind(&[
                (published_only as i32).into(),
                value_to_js(&category_value),
                value_to_js(&category_value),
            ])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_material).collect())
    }

    pub async fn get_material(&self, id: &str) -> PortalResult<Option<Material>> {
        let stmt = self.db.prepare("SELECT * FROM materials WHERE id = ?");

        let result = stmt
            .bind(&[id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<HashMap<String, Value>>(None)
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(result.map(row_to_material))
    }

    pub async fn store_material(&self, material: &Material) -> PortalResult<()> {
        let stmt = self.db.prepare(
            "INSERT OR REPLACE INTO materials (
                id, title, description, category, content_url, cover_url,
                sort_order, published, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        );

        stmt.bind(&[
            material.id.clone().into(),
            material.title.clone().into(),
            material.description.clone().into(),
            material.category.clone().into(),
            material.content_url.clone().into(),
            material.cover_url.clone().unwrap_or_default().into(),
            (material.sort_order as f64).into(),
            material.published.into(),
            (material.created_at as f64).into(),
            (material.updated_at as f64).into(),
        ])
        .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
        .run()
        .await
        .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn delete_material(&self, id: &str) -> PortalResult<()> {
        self.delete_by_id("materials", id).await
    }

    // ============= EVENT OPERATIONS =============

    pub async fn list_events(
        &self,
        published_only: bool,
        starts_after: Option<i64>,
    ) -> PortalResult<Vec<Event>> {
        let stmt = self.db.prepare(
            "SELECT * FROM events
             WHERE (? = 0 OR published = 1) AND starts_at >= ?
             ORDER BY starts_at ASC",
        );

        let result = stmt
            .bind(&[
                (published_only as i32).into(),
                (starts_after.unwrap_or(0) as f64).into(),
            ])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_event).collect())
    }

    pub async fn get_event(&self, id: &str) -> PortalResult<Option<Event>> {
        let stmt = self.db.prepare("SELECT * FROM events WHERE id = ?");

        let result = stmt
            .bind(&[id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<HashMap<String, Value>>(None)
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(result.map(row_to_event))
    }

    pub async fn store_event(&self, event: &Event) -> PortalResult<()> {
        let stmt = self.db.prepare(
            "INSERT OR REPLACE INTO events (
                id, title, description, starts_at, location, link, cover_url,
                published, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        );

        stmt.bind(&[
            event.id.clone().into(),
            event.title.clone().into(),
            event.description.clone().into(),
            (event.starts_at as f64).into(),
            event.location.clone().unwrap_or_default().into(),
            event.link.clone().unwrap_or_default().into(),
            event.cover_url.clone().unwrap_or_default().into(),
            event.published.into(),
            (event.created_at as f64).into(),
            (event.updated_at as f64).into(),
        ])
        .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
        .run()
        .await
        .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn delete_event(&self, id: &str) -> PortalResult<()> {
        self.delete_by_id("events", id).await
    }

    // ============= FAQ OPERATIONS =============

    pub async fn list_faq(&self, published_only: bool) -> PortalResult<Vec<FaqItem>> {
        let stmt = self.db.prepare(
            "SELECT * FROM faq_items WHERE (? = 0 OR published = 1) ORDER BY sort_order ASC",
        );

        let result = stmt
            .bind(&[(published_only as i32).into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_faq_item).collect())
    }

    pub async fn get_faq_item(&self, id: &str) -> PortalResult<Option<FaqItem>> {
        let stmt = self.db.prepare("SELECT * FROM faq_items WHERE id = ?");

        let result = stmt
            .bind(&[id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<HashMap<String, Value>>(None)
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(result.map(row_to_faq_item))
    }

    pub async fn store_faq_item(&self, item: &FaqItem) -> PortalResult<()> {
        let stmt = self.db.prepare(
            "INSERT OR REPLACE INTO faq_items (id, question, answer, sort_order, published)
             VALUES (?, ?, ?, ?, ?)",
        );

        stmt.bind(&[
            item.id.clone().into(),
            item.question.clone().into(),
            item.answer.clone().into(),
            (item.sort_order as f64).into(),
            item.published.into(),
        ])
        .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
        .run()
        .await
        .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn delete_faq_item(&self, id: &str) -> PortalResult<()> {
        self.delete_by_id("faq_items", id).await
    }

    // ============= REVIEW OPERATIONS =============

    pub async fn list_reviews(&self, approved_only: bool) -> PortalResult<Vec<Review>> {
        let stmt = self.db.prepare(
            "SELECT * FROM reviews WHERE (? = 0 OR approved = 1) ORDER BY created_at DESC",
        );

        let result = stmt
            .bind(&[(approved_only as i32).into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_review).collect())
    }

    pub async fn list_pending_reviews(&self) -> PortalResult<Vec<Review>> {
        let stmt = self
            .db
            .prepare("SELECT * FROM reviews WHERE approved = 0 ORDER BY created_at ASC");

        let result = stmt
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_review).collect())
    }

    pub async fn insert_review(&self, review: &Review) -> PortalResult<()> {
        let stmt = self.db.prepare(
            "INSERT INTO reviews (id, user_id, author_name, text, rating, approved, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        );

        stmt.bind(&[
            review.id.clone().into(),
            review.user_id.clone().into(),
            review.author_name.clone().into(),
            review.text.clone().into(),
            (review.rating as f64).into(),
            review.approved.into(),
            (review.created_at as f64).into(),
        ])
        .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
        .run()
        .await
        .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn set_review_approved(&self, id: &str, approved: bool) -> PortalResult<()> {
        let stmt = self.db.prepare("UPDATE reviews SET approved = ? WHERE id = ?");

        stmt.bind(&[approved.into(), id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .run()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn delete_review(&self, id: &str) -> PortalResult<()> {
        self.delete_by_id("reviews", id).await
    }

    // ============= FAVORITE OPERATIONS =============

    pub async fn add_favorite(&self, favorite: &Favorite) -> PortalResult<()> {
        let stmt = self.db.prepare(
            "INSERT OR REPLACE INTO favorites (user_id, material_id, created_at) VALUES (?, ?, ?)",
        );

        stmt.bind(&[
            favorite.user_id.clone().into(),
            favorite.material_id.clone().into(),
            (favorite.created_at as f64).into(),
        ])
        .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
        .run()
        .await
        .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn remove_favorite(&self, user_id: &str, material_id: &str) -> PortalResult<()> {
        let stmt = self
            .db
            .prepare("DELETE FROM favorites WHERE user_id = ? AND material_id = ?");

        stmt.bind(&[user_id.into(), material_id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .run()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    /// Materials the member saved, newest saves first.
    pub async fn list_favorite_materials(&self, user_id: &str) -> PortalResult<Vec<Material>> {
        let stmt = self.db.prepare(
            "SELECT m.* FROM materials m
             JOIN favorites f ON f.material_id = m.id
             WHERE f.user_id = ? AND m.published = 1
             ORDER BY f.created_at DESC",
        );

        let result = stmt
            .bind(&[user_id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_material).collect())
    }

    // ============= COURSE OPERATIONS =============

    pub async fn list_courses(&self, published_only: bool) -> PortalResult<Vec<Course>> {
        let stmt = self.db.prepare(
            "SELECT * FROM courses WHERE (? = 0 OR published = 1) ORDER BY sort_order ASC",
        );

        let result = stmt
            .bind(&[(published_only as i32).into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_course).collect())
    }

    pub async fn get_course(&self, id: &str) -> PortalResult<Option<Course>> {
        let stmt = self.db.prepare("SELECT * FROM courses WHERE id = ?");

        let result = stmt
            .bind(&[id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<HashMap<String, Value>>(None)
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(result.map(row_to_course))
    }

    pub async fn store_course(&self, course: &Course) -> PortalResult<()> {
        let product_codes_json = serde_json::to_string(&course.product_codes).map_err(|e| {
            PortalError::parse_error(format!("Failed to serialize product codes: {}", e))
        })?;

        let stmt = self.db.prepare(
            "INSERT OR REPLACE INTO courses (
                id, title, description, product_codes, sort_order, published
            ) VALUES (?, ?, ?, ?, ?, ?)",
        );

        stmt.bind(&[
            course.id.clone().into(),
            course.title.clone().into(),
            course.description.clone().into(),
            product_codes_json.into(),
            (course.sort_order as f64).into(),
            course.published.into(),
        ])
        .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
        .run()
        .await
        .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn delete_course(&self, id: &str) -> PortalResult<()> {
        self.delete_by_id("courses", id).await
    }

    // ============= PAYMENT OPERATIONS =============

    pub async fn insert_prodamus_payment(&self, payment: &ProdamusPayment) -> PortalResult<()> {
        let payload_json = serde_json::to_string(&payment.payload).map_err(|e| {
            PortalError::parse_error(format!("Failed to serialize payment payload: {}", e))
        })?;

        let stmt = self.db.prepare(
            "INSERT INTO payments_prodamus (id, user_id, payload, created_at) VALUES (?, ?, ?, ?)",
        );

        stmt.bind(&[
            payment.id.clone().into(),
            payment.user_id.clone().into(),
            payload_json.into(),
            (payment.created_at as f64).into(),
        ])
        .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
        .run()
        .await
        .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn insert_lava_payment(&self, payment: &LavaPayment) -> PortalResult<()> {
        let stmt = self.db.prepare(
            "INSERT INTO payments_lava (id, user_id, amount, status, created_at)
             VALUES (?, ?, ?, ?, ?)",
        );

        stmt.bind(&[
            payment.id.clone().into(),
            payment.user_id.clone().into(),
            payment.amount.into(),
            payment.status.clone().into(),
            (payment.created_at as f64).into(),
        ])
        .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
        .run()
        .await
        .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }

    pub async fn list_prodamus_payments(&self) -> PortalResult<Vec<ProdamusPayment>> {
        let stmt = self.db.prepare("SELECT * FROM payments_prodamus");

        let result = stmt
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_prodamus_payment).collect())
    }

    pub async fn list_prodamus_payments_for_user(
        &self,
        user_id: &str,
    ) -> PortalResult<Vec<ProdamusPayment>> {
        let stmt = self
            .db
            .prepare("SELECT * FROM payments_prodamus WHERE user_id = ?");

        let result = stmt
            .bind(&[user_id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_prodamus_payment).collect())
    }

    pub async fn list_lava_payments(&self) -> PortalResult<Vec<LavaPayment>> {
        let stmt = self.db.prepare("SELECT * FROM payments_lava");

        let result = stmt
            .all()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<HashMap<String, Value>>()
            .map_err(|e| PortalError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_lava_payment).collect())
    }

    // ============= HELPERS =============

    async fn delete_by_id(&self, table: &str, id: &str) -> PortalResult<()> {
        // Table names come from call sites only, never from request input.
        let stmt = self
            .db
            .prepare(format!("DELETE FROM {} WHERE id = ?", table));

        stmt.bind(&[id.into()])
            .map_err(|e| PortalError::database_error(format!("Failed to bind parameters: {}", e)))?
            .run()
            .await
            .map_err(|e| PortalError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(())
    }
}

fn value_to_js(value: &Value) -> worker::wasm_bindgen::JsValue {
    match value {
        Value::Null => worker::wasm_bindgen::JsValue::NULL,
        Value::String(s) => s.clone().into(),
        _ => value.to_string().into(),
    }
}

// ============= ROW CONVERSIONS =============

pub fn row_to_user(row: HashMap<String, Value>) -> UserRecord {
    UserRecord {
        user_id: value_to_string(row.get("user_id")),
        username: value_to_opt_string(row.get("username")),
        first_name: value_to_opt_string(row.get("first_name")),
        photo_url: value_to_opt_string(row.get("photo_url")),
        utm_1: value_to_opt_string(row.get("utm_1")),
        utm_2: value_to_opt_string(row.get("utm_2")),
        utm_3: value_to_opt_string(row.get("utm_3")),
        utm_4: value_to_opt_string(row.get("utm_4")),
        utm_5: value_to_opt_string(row.get("utm_5")),
        registered: value_to_bool(row.get("registered")),
        all_payments: {
            let raw = value_to_string(row.get("all_payments"));
            if raw.is_empty() {
                "0".to_string()
            } else {
                raw
            }
        },
        created_at: value_to_i64(row.get("created_at")),
        updated_at: value_to_i64(row.get("updated_at")),
    }
}

pub fn row_to_material(row: HashMap<String, Value>) -> Material {
    Material {
        id: value_to_string(row.get("id")),
        title: value_to_string(row.get("title")),
        description: value_to_string(row.get("description")),
        category: value_to_string(row.get("category")),
        content_url: value_to_string(row.get("content_url")),
        cover_url: value_to_opt_string(row.get("cover_url")),
        sort_order: value_to_i64(row.get("sort_order")),
        published: value_to_bool(row.get("published")),
        created_at: value_to_i64(row.get("created_at")),
        updated_at: value_to_i64(row.get("updated_at")),
    }
}

pub fn row_to_event(row: HashMap<String, Value>) -> Event {
    Event {
        id: value_to_string(row.get("id")),
        title: value_to_string(row.get("title")),
        description: value_to_string(row.get("description")),
        starts_at: value_to_i64(row.get("starts_at")),
        location: value_to_opt_string(row.get("location")),
        link: value_to_opt_string(row.get("link")),
        cover_url: value_to_opt_string(row.get("cover_url")),
        published: value_to_bool(row.get("published")),
        created_at: value_to_i64(row.get("created_at")),
        updated_at: value_to_i64(row.get("updated_at")),
    }
}

pub fn row_to_faq_item(row: HashMap<String, Value>) -> FaqItem {
    FaqItem {
        id: value_to_string(row.get("id")),
        question: value_to_string(row.get("question")),
        answer: value_to_string(row.get("answer")),
        sort_order: value_to_i64(row.get("sort_order")),
        published: value_to_bool(row.get("published")),
    }
}

pub fn row_to_review(row: HashMap<String, Value>) -> Review {
    Review {
        id: value_to_string(row.get("id")),
        user_id: value_to_string(row.get("user_id")),
        author_name: value_to_string(row.get("author_name")),
        text: value_to_string(row.get("text")),
        rating: value_to_i64(row.get("rating")),
        approved: value_to_bool(row.get("approved")),
        created_at: value_to_i64(row.get("created_at")),
    }
}

pub fn row_to_course(row: HashMap<String, Value>) -> Course {
    let product_codes = row
        .get("product_codes")
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
        .unwrap_or_default();

    Course {
        id: value_to_string(row.get("id")),
        title: value_to_string(row.get("title")),
        description: value_to_string(row.get("description")),
        product_codes,
        sort_order: value_to_i64(row.get("sort_order")),
        published: value_to_bool(row.get("published")),
    }
}

pub fn row_to_prodamus_payment(row: HashMap<String, Value>) -> ProdamusPayment {
    // The payload column holds whatever the provider posted; if it is not
    // valid JSON the raw text is kept and the normalizer decides later.
    let payload = match row.get("payload") {
        Some(Value::String(raw)) => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
        }
        Some(other) => other.clone(),
        None => Value::Null,
    };

    ProdamusPayment {
        id: value_to_string(row.get("id")),
        user_id: value_to_string(row.get("user_id")),
        payload,
        created_at: value_to_i64(row.get("created_at")),
    }
}

pub fn row_to_lava_payment(row: HashMap<String, Value>) -> LavaPayment {
    LavaPayment {
        id: value_to_string(row.get("id")),
        user_id: value_to_string(row.get("user_id")),
        amount: value_to_f64(row.get("amount")),
        status: value_to_string(row.get("status")),
        created_at: value_to_i64(row.get("created_at")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_row_to_user_normalizes_blanks() {
        let user = row_to_user(row(&[
            ("user_id", json!("42")),
            ("username", json!("")),
            ("utm_1", json!("fb")),
            ("registered", json!(1)),
            ("all_payments", json!("")),
            ("created_at", json!(1_700_000_000_000_i64)),
        ]));

        assert_eq!(user.user_id, "42");
        assert_eq!(user.username, None);
        assert_eq!(user.utm_1.as_deref(), Some("fb"));
        assert!(user.registered);
        assert_eq!(user.all_payments, "0");
    }

    #[test]
    fn test_row_to_prodamus_payment_keeps_encoded_string() {
        let payment = row_to_prodamus_payment(row(&[
            ("id", json!("p1")),
            ("user_id", json!("42")),
            (
                "payload",
                json!("{\"sum\": \"100\", \"payment_status\": \"success\"}"),
            ),
        ]));

        assert_eq!(payment.payload["sum"], json!("100"));
    }

    #[test]
    fn test_row_to_prodamus_payment_tolerates_garbage() {
        let payment = row_to_prodamus_payment(row(&[
            ("id", json!("p1")),
            ("user_id", json!("42")),
            ("payload", json!("{broken")),
        ]));

        assert_eq!(payment.payload, json!("{broken"));
    }

    #[test]
    fn test_row_to_course_parses_product_codes() {
        let course = row_to_course(row(&[
            ("id", json!("c1")),
            ("title", json!("Base")),
            ("product_codes", json!("[\"base-course\",\"combo\"]")),
            ("published", json!(1)),
        ]));

        assert_eq!(course.product_codes, vec!["base-course", "combo"]);
    }
}
