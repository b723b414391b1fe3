use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

static SLUG_INVALID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid regex"));
static SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").expect("valid regex"));

fn slug_base(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = SLUG_INVALID.replace_all(&lowered, "");
    SLUG_SEPARATORS
        .replace_all(stripped.trim(), "-")
        .trim_matches('-')
        .to_string()
}

/// URL-safe slug for a newly inserted entity: sanitized name plus the current
/// millisecond timestamp. Not content-addressed; two imports of an
/// identically-named entity within the same millisecond can collide. Known
/// weakness, not a correctness guarantee.
pub fn slugify(name: &str) -> String {
    format!("{}-{}", slug_base(name), Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_is_lowercased_and_hyphenated() {
        assert_eq!(slug_base("Herrang Dance Camp"), "herrang-dance-camp");
        assert_eq!(slug_base("Smokey Feet!  2024"), "smokey-feet-2024");
        assert_eq!(slug_base("Rock-Step & Go"), "rock-step-go");
    }

    #[test]
    fn slug_ends_with_timestamp() {
        let slug = slugify("Lindy Shock");
        let suffix = slug.rsplit('-').next().unwrap();
        assert!(slug.starts_with("lindy-shock-"));
        assert!(suffix.parse::<i64>().is_ok());
    }
}
