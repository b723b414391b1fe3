use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{Row, Value};
use uuid::Uuid;

use super::traits::CandidateReader;
use crate::common::error::{FestError, Result};
use crate::database::DatabaseManager;
use crate::domain::*;

const EVENT_COLUMNS: &str = "id, name, slug, description, start_date, end_date, timezone, status, \
     venue_id, website_url, registration_url, source_url, created_at, updated_at";

const VENUE_COLUMNS: &str = "id, name, slug, address, city, state, country, postal_code, \
     latitude, longitude, created_at, updated_at";

const TEACHER_COLUMNS: &str =
    "id, name, slug, bio, specialties, website_url, image_url, created_at";

const MUSICIAN_COLUMNS: &str =
    "id, name, slug, bio, genres, instruments, website_url, image_url, created_at";

/// libSQL-backed implementation of the candidate queries.
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    // Rows must be converted before the cursor advances: a libsql `Row` is a
    // view into the statement's current position, so values read after the
    // next `next()` call come back as Null.
    async fn query_rows<T>(
        &self,
        sql: &str,
        params: Vec<Value>,
        to_item: fn(&Row) -> Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| FestError::from_store(format!("candidate query failed: {e}")))?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| FestError::from_store(format!("failed to read row: {e}")))?
        {
            out.push(to_item(&row)?);
        }
        Ok(out)
    }
}

/// Build an OR-joined `LIKE` predicate over `column`, one placeholder per
/// keyword.
fn like_clause(column: &str, keyword_count: usize) -> String {
    (0..keyword_count)
        .map(|i| format!("lower({column}) LIKE ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(" OR ")
}

fn like_params(keywords: &[String]) -> Vec<Value> {
    keywords
        .iter()
        .map(|k| Value::Text(format!("%{}%", k.to_lowercase())))
        .collect()
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| FestError::Database {
        message: format!("invalid UUID in row: {e}"),
    })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| FestError::Database {
        message: format!("invalid date in row: {e}"),
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FestError::Database {
            message: format!("invalid timestamp in row: {e}"),
        })
}

/// List-valued columns are stored as JSON text; a malformed cell degrades to
/// an empty list rather than failing the whole query.
fn parse_list(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

fn get_text(row: &Row, idx: i32) -> Result<String> {
    row.get::<String>(idx).map_err(|e| FestError::Database {
        message: format!("failed to read column {idx}: {e}"),
    })
}

fn get_opt_text(row: &Row, idx: i32) -> Option<String> {
    row.get::<String>(idx).ok()
}

fn row_to_event(row: &Row) -> Result<Event> {
    Ok(Event {
        id: Some(parse_uuid(&get_text(row, 0)?)?),
        name: get_text(row, 1)?,
        slug: get_text(row, 2)?,
        description: get_opt_text(row, 3),
        start_date: parse_date(&get_text(row, 4)?)?,
        end_date: parse_date(&get_text(row, 5)?)?,
        timezone: get_opt_text(row, 6),
        status: EventStatus::parse(&get_text(row, 7)?),
        venue_id: parse_uuid(&get_text(row, 8)?)?,
        website_url: get_opt_text(row, 9),
        registration_url: get_opt_text(row, 10),
        source_url: get_opt_text(row, 11),
        created_at: parse_timestamp(&get_text(row, 12)?)?,
        updated_at: parse_timestamp(&get_text(row, 13)?)?,
    })
}

fn row_to_venue(row: &Row) -> Result<Venue> {
    Ok(Venue {
        id: Some(parse_uuid(&get_text(row, 0)?)?),
        name: get_text(row, 1)?,
        slug: get_text(row, 2)?,
        address: get_opt_text(row, 3),
        city: get_text(row, 4)?,
        state: get_opt_text(row, 5),
        country: get_text(row, 6)?,
        postal_code: get_opt_text(row, 7),
        latitude: row.get::<f64>(8).ok(),
        longitude: row.get::<f64>(9).ok(),
        created_at: parse_timestamp(&get_text(row, 10)?)?,
        updated_at: parse_timestamp(&get_text(row, 11)?)?,
    })
}

fn row_to_teacher(row: &Row) -> Result<Teacher> {
    Ok(Teacher {
        id: Some(parse_uuid(&get_text(row, 0)?)?),
        name: get_text(row, 1)?,
        slug: get_text(row, 2)?,
        bio: get_opt_text(row, 3),
        specialties: parse_list(&get_text(row, 4)?),
        website_url: get_opt_text(row, 5),
        image_url: get_opt_text(row, 6),
        created_at: parse_timestamp(&get_text(row, 7)?)?,
    })
}

fn row_to_musician(row: &Row) -> Result<Musician> {
    Ok(Musician {
        id: Some(parse_uuid(&get_text(row, 0)?)?),
        name: get_text(row, 1)?,
        slug: get_text(row, 2)?,
        bio: get_opt_text(row, 3),
        genres: parse_list(&get_text(row, 4)?),
        instruments: parse_list(&get_text(row, 5)?),
        website_url: get_opt_text(row, 6),
        image_url: get_opt_text(row, 7),
        created_at: parse_timestamp(&get_text(row, 8)?)?,
    })
}

#[async_trait]
impl CandidateReader for DatabaseStorage {
    async fn events_by_name(&self, name: &str) -> Result<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE lower(name) = lower(?1)");
        self.query_rows(&sql, vec![Value::Text(name.to_string())], row_to_event).await
    }

    async fn events_matching(&self, keywords: &[String]) -> Result<Vec<Event>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE {}",
            like_clause("name", keywords.len())
        );
        self.query_rows(&sql, like_params(keywords), row_to_event).await
    }

    async fn events_overlapping(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Event>> {
        // ISO-8601 date strings compare correctly as text. Ranges are
        // half-open, so a stored range that merely touches the input's is
        // not a candidate.
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE start_date < ?2 AND end_date > ?1"
        );
        self.query_rows(
            &sql,
            vec![
                Value::Text(start.to_string()),
                Value::Text(end.to_string()),
            ],
            row_to_event,
        )
        .await
    }

    async fn venues_by_name(&self, name: &str) -> Result<Vec<Venue>> {
        let sql = format!("SELECT {VENUE_COLUMNS} FROM venues WHERE lower(name) = lower(?1)");
        self.query_rows(&sql, vec![Value::Text(name.to_string())], row_to_venue).await
    }

    async fn venues_matching(&self, keywords: &[String]) -> Result<Vec<Venue>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {VENUE_COLUMNS} FROM venues WHERE {}",
            like_clause("name", keywords.len())
        );
        self.query_rows(&sql, like_params(keywords), row_to_venue).await
    }

    async fn venues_matching_address(&self, keywords: &[String]) -> Result<Vec<Venue>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {VENUE_COLUMNS} FROM venues WHERE address IS NOT NULL AND ({})",
            like_clause("address", keywords.len())
        );
        self.query_rows(&sql, like_params(keywords), row_to_venue).await
    }

    async fn teachers_by_name(&self, name: &str) -> Result<Vec<Teacher>> {
        let sql = format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE lower(name) = lower(?1)");
        self.query_rows(&sql, vec![Value::Text(name.to_string())], row_to_teacher).await
    }

    async fn teachers_matching(&self, keywords: &[String]) -> Result<Vec<Teacher>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE {}",
            like_clause("name", keywords.len())
        );
        self.query_rows(&sql, like_params(keywords), row_to_teacher).await
    }

    async fn musicians_by_name(&self, name: &str) -> Result<Vec<Musician>> {
        let sql = format!("SELECT {MUSICIAN_COLUMNS} FROM musicians WHERE lower(name) = lower(?1)");
        self.query_rows(&sql, vec![Value::Text(name.to_string())], row_to_musician).await
    }

    async fn musicians_matching(&self, keywords: &[String]) -> Result<Vec<Musician>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {MUSICIAN_COLUMNS} FROM musicians WHERE {}",
            like_clause("name", keywords.len())
        );
        self.query_rows(&sql, like_params(keywords), row_to_musician).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_clause_numbers_placeholders() {
        assert_eq!(like_clause("name", 1), "lower(name) LIKE ?1");
        assert_eq!(
            like_clause("name", 3),
            "lower(name) LIKE ?1 OR lower(name) LIKE ?2 OR lower(name) LIKE ?3"
        );
    }

    #[test]
    fn like_params_wrap_and_lowercase() {
        let params = like_params(&["Herrang".to_string(), "camp".to_string()]);
        assert_eq!(
            params,
            vec![
                Value::Text("%herrang%".to_string()),
                Value::Text("%camp%".to_string())
            ]
        );
    }

    #[test]
    fn malformed_list_cell_degrades_to_empty() {
        assert_eq!(parse_list("not json"), Vec::<String>::new());
        assert_eq!(parse_list(r#"["balboa","shag"]"#), vec!["balboa", "shag"]);
    }
}
