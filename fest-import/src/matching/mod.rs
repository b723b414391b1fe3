pub mod dates;
pub mod text;

pub use dates::date_overlap;
pub use text::{is_same_musician, keywords, normalize_name, similarity};
