use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Countries offered by the picker. A trip holds each at most once.
pub const COUNTRIES: [&str; 18] = [
    "France",
    "Italy",
    "Spain",
    "Germany",
    "United Kingdom",
    "Netherlands",
    "Switzerland",
    "Austria",
    "Portugal",
    "Greece",
    "Japan",
    "Thailand",
    "United States",
    "Canada",
    "Australia",
    "New Zealand",
    "Brazil",
    "Argentina",
];

pub fn is_known_country(name: &str) -> bool {
    COUNTRIES.contains(&name)
}

pub(crate) fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Signed-in account as returned by the backend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub countries: Vec<Country>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cities: Vec<City>,
}

impl Country {
    pub fn new(name: &str) -> Self {
        Self {
            id: fresh_id(),
            name: name.to_string(),
            cities: vec![],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl City {
    pub fn new(name: &str) -> Self {
        Self {
            id: fresh_id(),
            name: name.to_string(),
            places: vec![],
            documents: vec![],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Place {
    pub fn new(name: &str) -> Self {
        Self {
            id: fresh_id(),
            name: name.to_string(),
            description: String::new(),
        }
    }
}

/// A file attached to a city. `path` addresses the backing stored object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub url: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn from_stored(name: &str, media_type: &str, size: u64, stored: StoredObject) -> Self {
        Self {
            id: fresh_id(),
            name: name.to_string(),
            url: stored.url,
            path: stored.path,
            media_type: media_type.to_string(),
            size,
            uploaded_at: Utc::now(),
        }
    }
}

/// Reference to a blob held by the storage backend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub path: String,
}

/// Payload for creating a trip.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TripDraft {
    pub name: String,
    pub description: String,
    pub countries: Vec<Country>,
}

impl TripDraft {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            countries: vec![],
        }
    }
}

/// The persisted representation written by a save. Timestamps and ownership
/// are maintained by the backend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TripDocument {
    pub name: String,
    pub description: String,
    pub countries: Vec<Country>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub country_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<Trip> for TripSummary {
    fn from(trip: Trip) -> Self {
        Self {
            country_count: trip.countries.len(),
            id: trip.id,
            name: trip.name,
            description: trip.description,
            updated_at: trip.updated_at,
        }
    }
}

/// Most recently updated first.
pub fn sort_summaries(mut items: Vec<TripSummary>) -> Vec<TripSummary> {
    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    items
}
