use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod record;

pub use record::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub address: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle status of a persisted event. Imports always create events as
/// `Draft`; promotion to `Published` happens outside this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Published => "PUBLISHED",
            EventStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> EventStatus {
        match s {
            "PUBLISHED" => EventStatus::Published,
            "CANCELLED" => EventStatus::Cancelled,
            _ => EventStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub timezone: Option<String>,
    pub status: EventStatus,
    pub venue_id: Uuid,
    pub website_url: Option<String>,
    pub registration_url: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub specialties: Vec<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Musician {
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub genres: Vec<String>,
    pub instruments: Vec<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTeacher {
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub teacher_id: Uuid,
    pub role: Option<String>,
    pub workshops: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// At most one row may exist per (event_id, musician_id) pair; the schema
/// enforces this with a unique constraint and the importer checks before
/// inserting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMusician {
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub musician_id: Uuid,
    pub role: Option<String>,
    pub set_times: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTag {
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPrice {
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub price_type: String,
    pub amount: f64,
    pub currency: String,
    pub deadline: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
