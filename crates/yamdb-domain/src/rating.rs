//! Title rating aggregation.

/// Lowest score a review may carry.
pub const MIN_SCORE: i16 = 1;

/// Highest score a review may carry.
pub const MAX_SCORE: i16 = 10;

/// Whether `score` lies in the accepted `1..=10` range.
pub fn is_valid_score(score: i16) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// Arithmetic mean of review scores.
///
/// Returns `None` for an empty set: a title without reviews has no rating,
/// which is not the same as a low one.
pub fn mean_rating<I>(scores: I) -> Option<f64>
where
    I: IntoIterator<Item = i16>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0i64, 0u32), |(sum, count), score| (sum + i64::from(score), count + 1));
    (count > 0).then(|| sum as f64 / f64::from(count))
}
