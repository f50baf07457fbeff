//! Capabilities the trip editor needs from the outside world.
//!
//! The browser build wires these to [`crate::api::ApiClient`] and the in-page
//! prompt dialog; tests use in-memory fakes.
#![allow(async_fn_in_trait)]

use crate::error::TripError;
use crate::models::{StoredObject, Trip, TripDocument, TripDraft, TripSummary};

pub trait TripRepository {
    async fn create(&self, owner_id: &str, draft: &TripDraft) -> Result<String, TripError>;

    async fn get(&self, trip_id: &str) -> Result<Trip, TripError>;

    /// Overwrite the stored trip record.
    async fn update(&self, trip_id: &str, doc: &TripDocument) -> Result<(), TripError>;

    async fn delete(&self, trip_id: &str) -> Result<(), TripError>;

    /// Most recently updated first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<TripSummary>, TripError>;
}

pub trait UploadAdapter {
    async fn store(
        &self,
        bytes: Vec<u8>,
        media_type: &str,
        path: &str,
    ) -> Result<StoredObject, TripError>;

    async fn release(&self, path: &str) -> Result<(), TripError>;

    fn derive_path(&self, owner_id: &str, trip_id: &str, city_id: &str, file_name: &str) -> String {
        derive_storage_path(owner_id, trip_id, city_id, file_name, unique_stamp())
    }
}

/// Ask the user for a short text value. `None` when cancelled.
pub trait Prompt {
    async fn ask(&self, message: &str) -> Option<String>;
}

/// Replace everything outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn derive_storage_path(
    owner_id: &str,
    trip_id: &str,
    city_id: &str,
    file_name: &str,
    stamp: String,
) -> String {
    format!(
        "users/{owner_id}/trips/{trip_id}/cities/{city_id}/{stamp}_{}",
        sanitize_file_name(file_name)
    )
}

/// Millisecond clock plus a random suffix, so the same file uploaded twice
/// in one millisecond still lands on distinct paths.
pub fn unique_stamp() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let rand = uuid::Uuid::new_v4().simple().to_string();
    format!("{millis}-{}", &rand[..8])
}
