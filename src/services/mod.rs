// src/services/mod.rs

pub mod analytics;
pub mod attribution;
pub mod course_access;
pub mod d1_database;
pub mod media_storage;
pub mod subscription;

pub use d1_database::D1Service;
pub use media_storage::MediaStorageService;
pub use subscription::SubscriptionService;
