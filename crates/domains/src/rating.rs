//! # Ratings
//!
//! The configured star scale and the visitor-relative rating summary.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// The set of star values a visitor may submit.
///
/// Loaded from configuration and mirrored in the `rating_stars` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarScale {
    values: Vec<i16>,
}

impl StarScale {
    /// Builds a scale from arbitrary values; duplicates are collapsed.
    pub fn new(values: impl IntoIterator<Item = i16>) -> Result<Self> {
        let mut values: Vec<i16> = values.into_iter().collect();
        values.sort_unstable();
        values.dedup();

        if values.is_empty() {
            return Err(AppError::Validation("star scale must not be empty".into()));
        }
        if values[0] <= 0 {
            return Err(AppError::Validation(format!(
                "star values must be positive, got {}",
                values[0]
            )));
        }
        Ok(Self { values })
    }

    pub fn contains(&self, star: i16) -> bool {
        self.values.binary_search(&star).is_ok()
    }

    /// Rejects a star outside the scale.
    pub fn validate(&self, star: i16) -> Result<i16> {
        if self.contains(star) {
            Ok(star)
        } else {
            Err(AppError::Validation(format!(
                "star value {star} is not one of {:?}",
                self.values
            )))
        }
    }

    pub fn values(&self) -> &[i16] {
        &self.values
    }
}

impl Default for StarScale {
    fn default() -> Self {
        Self {
            values: (1..=10).collect(),
        }
    }
}

/// Per-visitor aggregate of a movie's ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub has_rated: bool,
    /// `None` while nobody has rated the movie.
    pub mean_star: Option<f64>,
}

impl RatingSummary {
    /// Folds `(ip, star)` pairs of a single movie into a summary for `visitor_ip`.
    pub fn collect<'a, I>(ratings: I, visitor_ip: &str) -> Self
    where
        I: IntoIterator<Item = (&'a str, i16)>,
    {
        let mut has_rated = false;
        let mut total: i64 = 0;
        let mut count: u32 = 0;

        for (ip, star) in ratings {
            has_rated |= ip == visitor_ip;
            total += i64::from(star);
            count += 1;
        }

        let mean_star = match count {
            0 => None,
            n => Some(total as f64 / f64::from(n)),
        };
        Self {
            has_rated,
            mean_star,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_is_one_to_ten() {
        let scale = StarScale::default();
        assert!(scale.contains(1));
        assert!(scale.contains(10));
        assert!(!scale.contains(0));
        assert!(!scale.contains(11));
    }

    #[test]
    fn scale_rejects_empty_and_non_positive_values() {
        assert!(matches!(StarScale::new([]), Err(AppError::Validation(_))));
        assert!(matches!(StarScale::new([0, 1, 2]), Err(AppError::Validation(_))));
    }

    #[test]
    fn scale_validate_reports_the_offending_value() {
        let scale = StarScale::new([5, 1, 3, 3]).unwrap();
        assert_eq!(scale.values(), &[1, 3, 5]);
        assert_eq!(scale.validate(3).unwrap(), 3);
        let err = scale.validate(4).unwrap_err();
        assert!(err.to_string().contains("star value 4"));
    }

    #[test]
    fn summary_of_no_ratings_has_no_mean() {
        let summary = RatingSummary::collect(std::iter::empty(), "1.2.3.4");
        assert!(!summary.has_rated);
        assert_eq!(summary.mean_star, None);
    }

    #[test]
    fn summary_averages_all_stars_and_flags_the_visitor() {
        let ratings = [("1.1.1.1", 4), ("2.2.2.2", 7), ("3.3.3.3", 10)];
        let summary = RatingSummary::collect(ratings, "2.2.2.2");
        assert!(summary.has_rated);
        assert_eq!(summary.mean_star, Some(7.0));

        let stranger = RatingSummary::collect(ratings, "9.9.9.9");
        assert!(!stranger.has_rated);
        assert_eq!(stranger.mean_star, Some(7.0));
    }

    #[test]
    fn summary_mean_keeps_fractions() {
        let summary = RatingSummary::collect([("a", 1), ("b", 2)], "a");
        assert!((summary.mean_star.unwrap() - 1.5).abs() < f64::EPSILON);
    }
}
