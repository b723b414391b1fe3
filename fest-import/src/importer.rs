//! Transactional festival import. One connection, one transaction: venue,
//! event, teachers, musicians (with inline identity-merge), tags, prices,
//! then commit. Any step failure rolls the whole import back; the connection
//! is dropped on every exit path.

use std::sync::Arc;

use chrono::Utc;
use libsql::{Transaction, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use fest_core::database::DatabaseManager;
use fest_core::domain::{FestivalRecord, MusicianInput};
use fest_core::{FestError, Result};

use crate::matching::is_same_musician;
use crate::slug::slugify;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportCounts {
    pub teachers: usize,
    pub musicians: usize,
    pub tags: usize,
    pub prices: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub event_id: Uuid,
    pub venue_id: Uuid,
    pub counts: ImportCounts,
}

pub struct TransactionalImporter {
    db: Arc<DatabaseManager>,
}

/// Slice of a musician row consulted by the identity-merge scan.
struct ExistingMusician {
    id: Uuid,
    name: String,
    bio: Option<String>,
    instruments: Vec<String>,
}

impl TransactionalImporter {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Persist a festival record atomically. Returns the persisted
    /// identifiers and per-entity counts, or a single terminal error after
    /// rollback: `StoreUnavailable` for connectivity/credential failures,
    /// `WriteFailed` for everything else.
    pub async fn import_festival(&self, record: &FestivalRecord) -> Result<ImportSummary> {
        let conn = self.db.connect()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| terminal(FestError::from_store(format!("failed to begin transaction: {e}"))))?;

        match self.run_steps(&tx, record).await {
            Ok(summary) => {
                tx.commit().await.map_err(|e| {
                    terminal(FestError::from_store(format!("failed to commit import: {e}")))
                })?;
                info!(
                    "imported festival '{}' as event {} ({} teachers, {} musicians, {} tags, {} prices)",
                    record.name,
                    summary.event_id,
                    summary.counts.teachers,
                    summary.counts.musicians,
                    summary.counts.tags,
                    summary.counts.prices,
                );
                Ok(summary)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!("rollback after failed import also failed: {rb}");
                }
                Err(terminal(e))
            }
        }
    }

    async fn run_steps(&self, tx: &Transaction, record: &FestivalRecord) -> Result<ImportSummary> {
        let now = Utc::now().to_rfc3339();

        // Step 1: venue.
        let venue_id = Uuid::new_v4();
        execute(
            tx,
            "INSERT INTO venues (id, name, slug, address, city, state, country, postal_code, \
             latitude, longitude, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            vec![
                text(venue_id.to_string()),
                text(record.venue.name.clone()),
                text(slugify(&record.venue.name)),
                opt_text(&record.venue.address),
                text(record.venue.city.clone()),
                opt_text(&record.venue.state),
                text(record.venue.country.clone()),
                opt_text(&record.venue.postal_code),
                opt_real(record.venue.latitude),
                opt_real(record.venue.longitude),
                text(now.clone()),
                text(now.clone()),
            ],
            "insert venue",
        )
        .await?;

        // Step 2: event, always created as DRAFT.
        let event_id = Uuid::new_v4();
        execute(
            tx,
            "INSERT INTO events (id, name, slug, description, start_date, end_date, timezone, \
             status, venue_id, website_url, registration_url, source_url, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'DRAFT', ?8, ?9, ?10, ?11, ?12, ?13)",
            vec![
                text(event_id.to_string()),
                text(record.name.clone()),
                text(slugify(&record.name)),
                opt_text(&record.description),
                text(record.start_date.to_string()),
                text(record.end_date.to_string()),
                opt_text(&record.timezone),
                text(venue_id.to_string()),
                opt_text(&record.website_url),
                opt_text(&record.registration_url),
                opt_text(&record.source_url),
                text(now.clone()),
                text(now.clone()),
            ],
            "insert event",
        )
        .await?;

        let mut counts = ImportCounts::default();

        // Step 3: teachers. Deliberately not deduplicated; every import
        // creates fresh teacher rows.
        for teacher in &record.teachers {
            let teacher_id = Uuid::new_v4();
            execute(
                tx,
                "INSERT INTO teachers (id, name, slug, bio, specialties, website_url, image_url, \
                 created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                vec![
                    text(teacher_id.to_string()),
                    text(teacher.name.clone()),
                    text(slugify(&teacher.name)),
                    opt_text(&teacher.bio),
                    json_text(&teacher.specialties)?,
                    opt_text(&teacher.website_url),
                    opt_text(&teacher.image_url),
                    text(now.clone()),
                ],
                "insert teacher",
            )
            .await?;

            execute(
                tx,
                "INSERT INTO event_teachers (id, event_id, teacher_id, role, workshops, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                vec![
                    text(Uuid::new_v4().to_string()),
                    text(event_id.to_string()),
                    text(teacher_id.to_string()),
                    opt_text(&teacher.role),
                    json_text(&teacher.workshops)?,
                    text(now.clone()),
                ],
                "insert event-teacher link",
            )
            .await?;
            counts.teachers += 1;
        }

        // Step 4: musicians, with inline identity-merge.
        let mut existing = load_musicians(tx).await?;
        for musician in &record.musicians {
            let musician_id = self
                .resolve_musician(tx, &mut existing, musician, &now)
                .await?;

            if !event_musician_exists(tx, event_id, musician_id).await? {
                execute(
                    tx,
                    "INSERT INTO event_musicians (id, event_id, musician_id, role, set_times, \
                     created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    vec![
                        text(Uuid::new_v4().to_string()),
                        text(event_id.to_string()),
                        text(musician_id.to_string()),
                        opt_text(&musician.role),
                        json_text(&musician.set_times)?,
                        text(now.clone()),
                    ],
                    "insert event-musician link",
                )
                .await?;
                counts.musicians += 1;
            } else {
                debug!(
                    "musician '{}' already linked to event {}, skipping duplicate link",
                    musician.name, event_id
                );
            }
        }

        // Step 5: tags.
        for tag in &record.tags {
            execute(
                tx,
                "INSERT INTO event_tags (id, event_id, tag, created_at) VALUES (?1, ?2, ?3, ?4)",
                vec![
                    text(Uuid::new_v4().to_string()),
                    text(event_id.to_string()),
                    text(tag.clone()),
                    text(now.clone()),
                ],
                "insert event tag",
            )
            .await?;
            counts.tags += 1;
        }

        // Step 6: prices.
        for price in &record.prices {
            execute(
                tx,
                "INSERT INTO event_prices (id, event_id, price_type, amount, currency, deadline, \
                 description, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                vec![
                    text(Uuid::new_v4().to_string()),
                    text(event_id.to_string()),
                    text(price.price_type.clone()),
                    Value::Real(price.amount),
                    text(price.currency.clone()),
                    opt_text(&price.deadline.map(|d| d.to_string())),
                    opt_text(&price.description),
                    text(now.clone()),
                ],
                "insert event price",
            )
            .await?;
            counts.prices += 1;
        }

        Ok(ImportSummary {
            event_id,
            venue_id,
            counts,
        })
    }

    /// Resolve a musician input to a persisted row id. First matching
    /// existing musician wins (insertion order); a match with a missing bio
    /// absorbs the incoming bio and instrument list. No match inserts a new
    /// row, which later inputs in the same record can then match.
    async fn resolve_musician(
        &self,
        tx: &Transaction,
        existing: &mut Vec<ExistingMusician>,
        input: &MusicianInput,
        now: &str,
    ) -> Result<Uuid> {
        let position = existing
            .iter()
            .position(|m| is_same_musician(&m.name, &input.name));

        if let Some(i) = position {
            let matched = &mut existing[i];
            debug!(
                "musician '{}' matched existing '{}' ({})",
                input.name, matched.name, matched.id
            );

            if matched.bio.is_none() && input.bio.is_some() {
                let merged = merge_lists(&matched.instruments, &input.instruments);
                execute(
                    tx,
                    "UPDATE musicians SET bio = ?2, instruments = ?3 WHERE id = ?1",
                    vec![
                        text(matched.id.to_string()),
                        opt_text(&input.bio),
                        json_text(&merged)?,
                    ],
                    "update musician bio",
                )
                .await?;
                matched.bio = input.bio.clone();
                matched.instruments = merged;
            }
            return Ok(matched.id);
        }

        let id = Uuid::new_v4();
        execute(
            tx,
            "INSERT INTO musicians (id, name, slug, bio, genres, instruments, website_url, \
             image_url, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            vec![
                text(id.to_string()),
                text(input.name.clone()),
                text(slugify(&input.name)),
                opt_text(&input.bio),
                json_text(&input.genres)?,
                json_text(&input.instruments)?,
                opt_text(&input.website_url),
                opt_text(&input.image_url),
                text(now.to_string()),
            ],
            "insert musician",
        )
        .await?;

        existing.push(ExistingMusician {
            id,
            name: input.name.clone(),
            bio: input.bio.clone(),
            instruments: input.instruments.clone(),
        });
        Ok(id)
    }
}

/// Full musician scan, run inside the transaction. A table scan by design:
/// correctness over performance at expected catalog sizes.
async fn load_musicians(tx: &Transaction) -> Result<Vec<ExistingMusician>> {
    let mut rows = tx
        .query("SELECT id, name, bio, instruments FROM musicians", ())
        .await
        .map_err(|e| FestError::from_store(format!("load musicians: {e}")))?;

    let mut musicians = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| FestError::from_store(format!("load musicians: {e}")))?
    {
        let id: String = row
            .get(0)
            .map_err(|e| FestError::from_store(format!("load musicians: {e}")))?;
        let name: String = row
            .get(1)
            .map_err(|e| FestError::from_store(format!("load musicians: {e}")))?;
        let bio: Option<String> = row.get::<String>(2).ok();
        let instruments: Vec<String> = row
            .get::<String>(3)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        musicians.push(ExistingMusician {
            id: Uuid::parse_str(&id).map_err(|e| FestError::Database {
                message: format!("invalid musician UUID: {e}"),
            })?,
            name,
            bio,
            instruments,
        });
    }
    Ok(musicians)
}

async fn event_musician_exists(tx: &Transaction, event_id: Uuid, musician_id: Uuid) -> Result<bool> {
    let mut rows = tx
        .query(
            "SELECT 1 FROM event_musicians WHERE event_id = ?1 AND musician_id = ?2 LIMIT 1",
            vec![text(event_id.to_string()), text(musician_id.to_string())],
        )
        .await
        .map_err(|e| FestError::from_store(format!("check event-musician link: {e}")))?;

    let found = rows
        .next()
        .await
        .map_err(|e| FestError::from_store(format!("check event-musician link: {e}")))?
        .is_some();
    Ok(found)
}

async fn execute(tx: &Transaction, sql: &str, params: Vec<Value>, context: &str) -> Result<()> {
    tx.execute(sql, params)
        .await
        .map_err(|e| FestError::from_store(format!("{context}: {e}")))?;
    Ok(())
}

/// Set union preserving the order of the existing list.
fn merge_lists(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = existing.to_vec();
    for item in incoming {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

/// Collapse any non-terminal error into `WriteFailed`; connectivity failures
/// stay `StoreUnavailable` so callers can retry.
fn terminal(e: FestError) -> FestError {
    match e {
        FestError::StoreUnavailable { .. } | FestError::WriteFailed { .. } => e,
        other => FestError::WriteFailed {
            message: other.to_string(),
        },
    }
}

fn text(s: String) -> Value {
    Value::Text(s)
}

fn opt_text(v: &Option<String>) -> Value {
    match v {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

fn opt_real(v: Option<f64>) -> Value {
    match v {
        Some(f) => Value::Real(f),
        None => Value::Null,
    }
}

fn json_text(list: &[String]) -> Result<Value> {
    Ok(Value::Text(serde_json::to_string(list)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_lists_is_a_set_union_preserving_order() {
        let merged = merge_lists(
            &["piano".to_string(), "vocals".to_string()],
            &["vocals".to_string(), "trumpet".to_string()],
        );
        assert_eq!(merged, vec!["piano", "vocals", "trumpet"]);
    }

    #[test]
    fn terminal_promotes_database_errors_to_write_failed() {
        let e = terminal(FestError::Database {
            message: "no such table: event_prices".to_string(),
        });
        assert!(matches!(e, FestError::WriteFailed { .. }));

        let e = terminal(FestError::StoreUnavailable {
            message: "connection refused".to_string(),
        });
        assert!(matches!(e, FestError::StoreUnavailable { .. }));
    }
}
