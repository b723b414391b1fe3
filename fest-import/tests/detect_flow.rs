//! Detection tests against a real local database: records are written with
//! the importer, then probed with the detector through the libSQL-backed
//! candidate reader.

use std::sync::Arc;

use chrono::NaiveDate;
use fest_core::domain::{FestivalRecord, TeacherInput, VenueInput};
use fest_core::storage::{CandidateReader, DatabaseStorage};
use fest_core::DatabaseManager;
use fest_import::detect::{MatchKind, SuggestionAction, Tier};
use fest_import::{DuplicateDetector, TransactionalImporter};

async fn test_db() -> (tempfile::TempDir, Arc<DatabaseManager>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("fest.db");
    let db = DatabaseManager::new_local(path.to_str().unwrap())
        .await
        .expect("local database");
    db.run_migrations().await.expect("migrations");
    (dir, Arc::new(db))
}

fn detector(db: &Arc<DatabaseManager>) -> DuplicateDetector {
    DuplicateDetector::new(Arc::new(DatabaseStorage::new(db.clone())))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(name: &str, start: NaiveDate, end: NaiveDate) -> FestivalRecord {
    FestivalRecord {
        name: name.to_string(),
        description: None,
        start_date: start,
        end_date: end,
        timezone: None,
        website_url: None,
        registration_url: None,
        source_url: None,
        venue: VenueInput {
            name: "Folkets Hus".to_string(),
            address: Some("Storgatan 12".to_string()),
            city: "Stockholm".to_string(),
            state: None,
            country: "SE".to_string(),
            postal_code: None,
            latitude: None,
            longitude: None,
        },
        alternate_venues: Vec::new(),
        teachers: Vec::new(),
        musicians: Vec::new(),
        prices: Vec::new(),
        tags: Vec::new(),
    }
}

#[tokio::test]
async fn empty_store_reports_nothing() {
    let (_dir, db) = test_db().await;
    let report = detector(&db)
        .detect(&record("Spring Swing Camp", date(2024, 5, 1), date(2024, 5, 5)))
        .await;

    assert!(!report.has_duplicates);
    assert!(report.suggestions.is_empty());
}

#[tokio::test]
async fn reimporting_the_same_festival_is_flagged_high() {
    let (_dir, db) = test_db().await;
    let importer = TransactionalImporter::new(db.clone());
    importer
        .import_festival(&record("Spring Swing Camp", date(2024, 5, 1), date(2024, 5, 5)))
        .await
        .expect("import");

    // Name equality is case-insensitive.
    let report = detector(&db)
        .detect(&record("SPRING SWING CAMP", date(2024, 5, 1), date(2024, 5, 5)))
        .await;

    assert!(report.has_duplicates);
    assert_eq!(report.festivals.len(), 1);
    assert_eq!(report.festivals[0].similarity, 1.0);
    assert_eq!(report.festivals[0].tier, Tier::High);

    let festival_suggestion = report
        .suggestions
        .iter()
        .find(|s| s.kind == MatchKind::Festival)
        .expect("festival suggestion");
    assert_eq!(festival_suggestion.action, SuggestionAction::Skip);
    assert_eq!(festival_suggestion.confidence, 0.95);

    // The shared venue is flagged too, as a merge.
    assert_eq!(report.venues.len(), 1);
    let venue_suggestion = report
        .suggestions
        .iter()
        .find(|s| s.kind == MatchKind::Venue)
        .expect("venue suggestion");
    assert_eq!(venue_suggestion.action, SuggestionAction::Merge);
    assert_eq!(venue_suggestion.confidence, 0.90);
}

#[tokio::test]
async fn misspelled_name_is_caught_by_the_fuzzy_pass() {
    let (_dir, db) = test_db().await;
    let importer = TransactionalImporter::new(db.clone());
    importer
        .import_festival(&record("Herrang Dance Camp", date(2024, 6, 30), date(2024, 7, 27)))
        .await
        .expect("import");

    // Disjoint dates keep the date-overlap pass out of the picture; only
    // the keyword-driven fuzzy name pass can surface this one.
    let report = detector(&db)
        .detect(&record("Herang Dance Camp", date(2024, 10, 1), date(2024, 10, 5)))
        .await;

    assert_eq!(report.festivals.len(), 1);
    let m = &report.festivals[0];
    assert_eq!(m.name, "Herrang Dance Camp");
    assert!(m.similarity >= 0.85 && m.similarity < 1.0);
    assert_eq!(m.tier, Tier::High);
}

#[tokio::test]
async fn touching_date_ranges_are_not_overlap_candidates() {
    let (_dir, db) = test_db().await;
    let importer = TransactionalImporter::new(db.clone());
    importer
        .import_festival(&record("Spring Swing Camp", date(2024, 5, 1), date(2024, 5, 5)))
        .await
        .expect("import");

    let reader = DatabaseStorage::new(db.clone());

    // Half-open ranges: an input starting on the stored end date shares no
    // festival day with it and must not surface as a candidate.
    let touching = reader
        .events_overlapping(date(2024, 5, 5), date(2024, 5, 8))
        .await
        .expect("query");
    assert!(touching.is_empty());

    let overlapping = reader
        .events_overlapping(date(2024, 5, 4), date(2024, 5, 8))
        .await
        .expect("query");
    assert_eq!(overlapping.len(), 1);
}

#[tokio::test]
async fn known_teachers_are_reported_but_never_suggested() {
    let (_dir, db) = test_db().await;
    let importer = TransactionalImporter::new(db.clone());

    let mut stored = record("Spring Swing Camp", date(2024, 5, 1), date(2024, 5, 5));
    stored.teachers = vec![TeacherInput {
        name: "Frida Segerdahl".to_string(),
        bio: None,
        specialties: vec!["lindy hop".to_string()],
        website_url: None,
        image_url: None,
        role: None,
        workshops: Vec::new(),
    }];
    importer.import_festival(&stored).await.expect("import");

    let mut probe = record("Winter Stomp", date(2024, 12, 1), date(2024, 12, 3));
    probe.venue.name = "Somewhere Else".to_string();
    probe.venue.address = None;
    probe.teachers = stored.teachers.clone();

    let report = detector(&db).detect(&probe).await;

    assert_eq!(report.teachers.len(), 1);
    assert_eq!(report.teachers[0].similarity, 1.0);

    // Teacher matches are informational only; suggestions cover festivals
    // and venues.
    assert!(report
        .suggestions
        .iter()
        .all(|s| s.kind != MatchKind::Teacher));
}
