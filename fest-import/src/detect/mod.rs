//! Advisory duplicate detection. `detect` is read-only and never fails: a
//! query error in one entity-type pass degrades that pass to an empty result
//! list, and the four passes run concurrently since none depends on another.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use fest_core::domain::{FestivalRecord, MusicianInput, TeacherInput, VenueInput};
use fest_core::storage::CandidateReader;
use fest_core::Result;

use crate::matching::{date_overlap, keywords, similarity};

pub mod report;

pub use report::{
    DuplicateReport, FestivalMatch, MatchKind, MusicianMatch, Suggestion, SuggestionAction,
    TeacherMatch, Tier, VenueMatch,
};

/// Minimum similarity for a name-only fuzzy match to be reported at all.
const MEDIUM_THRESHOLD: f64 = 0.70;
/// Minimum combined score for the festival date-overlap pass.
const LOW_THRESHOLD: f64 = 0.50;
/// Address similarity at which a venue match is forced to tier `high`.
const ADDRESS_HIGH_THRESHOLD: f64 = 0.85;

const NAME_WEIGHT: f64 = 0.6;
const DATE_WEIGHT: f64 = 0.4;

pub struct DuplicateDetector {
    reader: Arc<dyn CandidateReader>,
}

impl DuplicateDetector {
    pub fn new(reader: Arc<dyn CandidateReader>) -> Self {
        Self { reader }
    }

    /// Run all four entity-type passes and assemble the report. Never
    /// returns an error; degraded passes come back empty.
    pub async fn detect(&self, record: &FestivalRecord) -> DuplicateReport {
        let (festivals, venues, teachers, musicians) = tokio::join!(
            self.festival_pass(record),
            self.venue_pass(record),
            self.teacher_pass(&record.teachers),
            self.musician_pass(&record.musicians),
        );

        let festivals = degrade("festival", festivals);
        let venues = degrade("venue", venues);
        let teachers = degrade("teacher", teachers);
        let musicians = degrade("musician", musicians);

        let suggestions = build_suggestions(&festivals, &venues);
        let has_duplicates = !festivals.is_empty()
            || !venues.is_empty()
            || !teachers.is_empty()
            || !musicians.is_empty();

        debug!(
            "duplicate detection for '{}': {} festival, {} venue, {} teacher, {} musician matches",
            record.name,
            festivals.len(),
            venues.len(),
            teachers.len(),
            musicians.len()
        );

        DuplicateReport {
            has_duplicates,
            festivals,
            venues,
            teachers,
            musicians,
            suggestions,
        }
    }

    async fn festival_pass(&self, record: &FestivalRecord) -> Result<Vec<FestivalMatch>> {
        let mut matches = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();

        // Exact case-insensitive name equality.
        for event in self.reader.events_by_name(&record.name).await? {
            let Some(id) = event.id else { continue };
            if seen.insert(id) {
                matches.push(FestivalMatch {
                    id,
                    name: event.name,
                    similarity: 1.0,
                    tier: Tier::High,
                    start_date: event.start_date,
                    end_date: event.end_date,
                });
            }
        }

        // Fuzzy name pass over keyword candidates.
        for event in self.reader.events_matching(&keywords(&record.name)).await? {
            let Some(id) = event.id else { continue };
            if seen.contains(&id) {
                continue;
            }
            let score = similarity(&record.name, &event.name);
            if score >= MEDIUM_THRESHOLD {
                seen.insert(id);
                matches.push(FestivalMatch {
                    id,
                    name: event.name,
                    similarity: score,
                    tier: Tier::for_score(score),
                    start_date: event.start_date,
                    end_date: event.end_date,
                });
            }
        }

        // Date-overlap pass: combined name/date score against events whose
        // range intersects the input's.
        for event in self
            .reader
            .events_overlapping(record.start_date, record.end_date)
            .await?
        {
            let Some(id) = event.id else { continue };
            if seen.contains(&id) {
                continue;
            }
            let name_score = similarity(&record.name, &event.name);
            let overlap = date_overlap(
                record.start_date,
                record.end_date,
                event.start_date,
                event.end_date,
            );
            let combined = NAME_WEIGHT * name_score + DATE_WEIGHT * overlap;
            if combined >= LOW_THRESHOLD {
                seen.insert(id);
                matches.push(FestivalMatch {
                    id,
                    name: event.name,
                    similarity: combined,
                    tier: Tier::for_score(combined),
                    start_date: event.start_date,
                    end_date: event.end_date,
                });
            }
        }

        Ok(matches)
    }

    async fn venue_pass(&self, record: &FestivalRecord) -> Result<Vec<VenueMatch>> {
        let mut matches = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();

        let inputs: Vec<&VenueInput> = std::iter::once(&record.venue)
            .chain(record.alternate_venues.iter())
            .collect();

        for input in inputs {
            for venue in self.reader.venues_by_name(&input.name).await? {
                let Some(id) = venue.id else { continue };
                if seen.insert(id) {
                    matches.push(VenueMatch {
                        id,
                        name: venue.name,
                        similarity: 1.0,
                        tier: Tier::High,
                        address: venue.address,
                        city: venue.city,
                    });
                }
            }

            for venue in self.reader.venues_matching(&keywords(&input.name)).await? {
                let Some(id) = venue.id else { continue };
                if seen.contains(&id) {
                    continue;
                }
                let score = similarity(&input.name, &venue.name);
                if score >= MEDIUM_THRESHOLD {
                    seen.insert(id);
                    matches.push(VenueMatch {
                        id,
                        name: venue.name,
                        similarity: score,
                        tier: Tier::for_score(score),
                        address: venue.address,
                        city: venue.city,
                    });
                }
            }

            // Address pass, reported only when the address text itself is a
            // near-exact match.
            if let Some(address) = &input.address {
                for venue in self
                    .reader
                    .venues_matching_address(&keywords(address))
                    .await?
                {
                    let Some(id) = venue.id else { continue };
                    if seen.contains(&id) {
                        continue;
                    }
                    let Some(candidate_address) = venue.address.clone() else {
                        continue;
                    };
                    let score = similarity(address, &candidate_address);
                    if score >= ADDRESS_HIGH_THRESHOLD {
                        seen.insert(id);
                        matches.push(VenueMatch {
                            id,
                            name: venue.name,
                            similarity: score,
                            tier: Tier::High,
                            address: Some(candidate_address),
                            city: venue.city,
                        });
                    }
                }
            }
        }

        Ok(matches)
    }

    async fn teacher_pass(&self, inputs: &[TeacherInput]) -> Result<Vec<TeacherMatch>> {
        let mut matches = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();

        for input in inputs {
            for teacher in self.reader.teachers_by_name(&input.name).await? {
                let Some(id) = teacher.id else { continue };
                if seen.insert(id) {
                    matches.push(TeacherMatch {
                        id,
                        name: teacher.name,
                        similarity: 1.0,
                        tier: Tier::High,
                        specialties: teacher.specialties,
                    });
                }
            }

            for teacher in self.reader.teachers_matching(&keywords(&input.name)).await? {
                let Some(id) = teacher.id else { continue };
                if seen.contains(&id) {
                    continue;
                }
                let score = similarity(&input.name, &teacher.name);
                if score >= MEDIUM_THRESHOLD {
                    seen.insert(id);
                    matches.push(TeacherMatch {
                        id,
                        name: teacher.name,
                        similarity: score,
                        tier: Tier::for_score(score),
                        specialties: teacher.specialties,
                    });
                }
            }
        }

        Ok(matches)
    }

    async fn musician_pass(&self, inputs: &[MusicianInput]) -> Result<Vec<MusicianMatch>> {
        let mut matches = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();

        for input in inputs {
            for musician in self.reader.musicians_by_name(&input.name).await? {
                let Some(id) = musician.id else { continue };
                if seen.insert(id) {
                    matches.push(MusicianMatch {
                        id,
                        name: musician.name,
                        similarity: 1.0,
                        tier: Tier::High,
                        genres: musician.genres,
                    });
                }
            }

            for musician in self
                .reader
                .musicians_matching(&keywords(&input.name))
                .await?
            {
                let Some(id) = musician.id else { continue };
                if seen.contains(&id) {
                    continue;
                }
                let score = similarity(&input.name, &musician.name);
                if score >= MEDIUM_THRESHOLD {
                    seen.insert(id);
                    matches.push(MusicianMatch {
                        id,
                        name: musician.name,
                        similarity: score,
                        tier: Tier::for_score(score),
                        genres: musician.genres,
                    });
                }
            }
        }

        Ok(matches)
    }
}

fn degrade<T>(entity: &str, result: Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(matches) => matches,
        Err(e) => {
            warn!("duplicate detection degraded for {entity} pass: {e}");
            Vec::new()
        }
    }
}

fn build_suggestions(festivals: &[FestivalMatch], venues: &[VenueMatch]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for m in festivals {
        match m.tier {
            Tier::High => suggestions.push(Suggestion {
                action: SuggestionAction::Skip,
                kind: MatchKind::Festival,
                existing_id: m.id,
                existing_name: m.name.clone(),
                confidence: 0.95,
            }),
            Tier::Medium => suggestions.push(Suggestion {
                action: SuggestionAction::Merge,
                kind: MatchKind::Festival,
                existing_id: m.id,
                existing_name: m.name.clone(),
                confidence: 0.80,
            }),
            Tier::Low => {}
        }
    }

    for m in venues {
        match m.tier {
            Tier::High => suggestions.push(Suggestion {
                action: SuggestionAction::Merge,
                kind: MatchKind::Venue,
                existing_id: m.id,
                existing_name: m.name.clone(),
                confidence: 0.90,
            }),
            Tier::Medium => suggestions.push(Suggestion {
                action: SuggestionAction::Merge,
                kind: MatchKind::Venue,
                existing_id: m.id,
                existing_name: m.name.clone(),
                confidence: 0.70,
            }),
            Tier::Low => {}
        }
    }

    suggestions
}
