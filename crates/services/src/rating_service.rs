//! # Rating Aggregator
//!
//! Reads the visitor-relative rating summary of a movie and records a
//! visitor's star through the repository's atomic upsert.

use std::sync::Arc;

use domains::{
    AppError, MovieId, MovieRepository, Rating, RatingRepository, RatingSummary, Result,
    StarScale,
};

#[derive(Clone)]
pub struct RatingService {
    movies: Arc<dyn MovieRepository>,
    ratings: Arc<dyn RatingRepository>,
    scale: StarScale,
}

impl RatingService {
    pub fn new(
        movies: Arc<dyn MovieRepository>,
        ratings: Arc<dyn RatingRepository>,
        scale: StarScale,
    ) -> Self {
        Self {
            movies,
            ratings,
            scale,
        }
    }

    /// Mean star of the movie and whether `visitor_ip` has rated it.
    pub async fn aggregate(&self, movie: MovieId, visitor_ip: &str) -> Result<RatingSummary> {
        self.ensure_published(movie).await?;
        Ok(self.ratings.summary(movie, visitor_ip).await?)
    }

    /// Records `star` for `(movie, visitor_ip)`, overwriting an earlier rating.
    pub async fn rate(&self, movie: MovieId, visitor_ip: &str, star: i16) -> Result<Rating> {
        let star = self.scale.validate(star)?;
        self.ensure_published(movie).await?;

        let rating = self.ratings.upsert(movie, visitor_ip, star).await?;
        tracing::info!(movie_id = movie, rating_id = rating.id, star, "rating recorded");
        Ok(rating)
    }

    async fn ensure_published(&self, movie: MovieId) -> Result<()> {
        if self.movies.is_published(movie).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Movie", movie))
        }
    }
}
