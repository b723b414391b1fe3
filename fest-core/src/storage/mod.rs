pub mod database;
pub mod traits;

pub use database::DatabaseStorage;
pub use traits::CandidateReader;
