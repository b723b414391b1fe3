//! Transient input shapes for a single festival import. The caller owns a
//! `FestivalRecord` until it hands it to `detect` or `import_festival`;
//! neither retains a reference after returning. Inputs are assumed to have
//! passed required-field validation upstream.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FestivalRecord {
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub timezone: Option<String>,
    pub website_url: Option<String>,
    pub registration_url: Option<String>,
    pub source_url: Option<String>,
    pub venue: VenueInput,
    /// Secondary locations; only `venue` is persisted by the importer.
    #[serde(default)]
    pub alternate_venues: Vec<VenueInput>,
    #[serde(default)]
    pub teachers: Vec<TeacherInput>,
    #[serde(default)]
    pub musicians: Vec<MusicianInput>,
    #[serde(default)]
    pub prices: Vec<PriceInput>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueInput {
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherInput {
    pub name: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub workshops: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicianInput {
    pub name: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub set_times: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceInput {
    pub price_type: String,
    pub amount: f64,
    pub currency: String,
    pub deadline: Option<NaiveDate>,
    pub description: Option<String>,
}
