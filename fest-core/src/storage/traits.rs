use crate::common::error::Result;
use crate::domain::*;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Read-only candidate queries consumed by the duplicate detector. The
/// detector takes this as an injected handle so its classification logic can
/// be exercised against a fake store in tests.
///
/// `*_by_name` methods match on case-insensitive full-name equality.
/// `*_matching` methods return candidates whose name contains any of the
/// given keywords; callers score and filter the results themselves.
#[async_trait]
pub trait CandidateReader: Send + Sync {
    async fn events_by_name(&self, name: &str) -> Result<Vec<Event>>;
    async fn events_matching(&self, keywords: &[String]) -> Result<Vec<Event>>;
    async fn events_overlapping(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Event>>;

    async fn venues_by_name(&self, name: &str) -> Result<Vec<Venue>>;
    async fn venues_matching(&self, keywords: &[String]) -> Result<Vec<Venue>>;
    async fn venues_matching_address(&self, keywords: &[String]) -> Result<Vec<Venue>>;

    async fn teachers_by_name(&self, name: &str) -> Result<Vec<Teacher>>;
    async fn teachers_matching(&self, keywords: &[String]) -> Result<Vec<Teacher>>;

    async fn musicians_by_name(&self, name: &str) -> Result<Vec<Musician>>;
    async fn musicians_matching(&self, keywords: &[String]) -> Result<Vec<Musician>>;
}
