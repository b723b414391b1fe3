use chrono::NaiveDate;

/// Fractional overlap of two half-open day intervals, scored against the
/// shorter of the two ranges so a short event fully nested inside a long
/// festival scores 1.0. Zero-duration or disjoint ranges score 0.0.
pub fn date_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> f64 {
    let duration_a = (a_end - a_start).num_days();
    let duration_b = (b_end - b_start).num_days();
    if duration_a <= 0 || duration_b <= 0 {
        return 0.0;
    }

    let overlap_start = a_start.max(b_start);
    let overlap_end = a_end.min(b_end);
    let intersection = (overlap_end - overlap_start).num_days();
    if intersection <= 0 {
        return 0.0;
    }

    (intersection as f64 / duration_a.min(duration_b) as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn partial_overlap_scores_against_shorter_range() {
        // [1,5) and [3,8): intersection 2 days over min(4,5) = 0.5
        assert_eq!(date_overlap(day(1), day(5), day(3), day(8)), 0.5);
    }

    #[test]
    fn nested_short_range_scores_full() {
        assert_eq!(date_overlap(day(1), day(11), day(4), day(5)), 1.0);
        assert_eq!(date_overlap(day(4), day(5), day(1), day(11)), 1.0);
    }

    #[test]
    fn disjoint_ranges_score_zero() {
        assert_eq!(date_overlap(day(1), day(3), day(10), day(12)), 0.0);
        // Half-open: touching endpoints do not overlap.
        assert_eq!(date_overlap(day(1), day(3), day(3), day(5)), 0.0);
    }

    #[test]
    fn zero_duration_range_scores_zero() {
        assert_eq!(date_overlap(day(2), day(2), day(1), day(5)), 0.0);
    }

    #[test]
    fn identical_ranges_score_full() {
        assert_eq!(date_overlap(day(1), day(5), day(1), day(5)), 1.0);
    }
}
