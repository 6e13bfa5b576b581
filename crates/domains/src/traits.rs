//! # Core Traits (Ports)
//!
//! Any storage adapter must implement these traits to be used by the services.
//! Adapters report their own failures through `anyhow`; the services lift them
//! into [`crate::AppError::Internal`].

use async_trait::async_trait;

use crate::models::{
    Actor, ActorId, ActorSummary, MovieFilter, MovieId, MovieListItem, MovieRecord, NewReview,
    Rating, Review, ReviewId,
};
use crate::rating::RatingSummary;

/// Read access to movies. Every method sees published (non-draft) movies only.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Filtered, paginated listing annotated with the visitor's rating summary.
    async fn list_published(
        &self,
        filter: &MovieFilter,
        visitor_ip: &str,
    ) -> anyhow::Result<Vec<MovieListItem>>;

    async fn find_published(&self, id: MovieId) -> anyhow::Result<Option<MovieRecord>>;

    async fn is_published(&self, id: MovieId) -> anyhow::Result<bool>;
}

/// Ratings keyed by `(movie, ip)`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Lock-free read of the movie's mean star and the visitor's flag.
    async fn summary(&self, movie: MovieId, visitor_ip: &str) -> anyhow::Result<RatingSummary>;

    /// Atomic insert-or-update. Must never leave two rows for one `(movie, ip)`.
    async fn upsert(&self, movie: MovieId, ip: &str, star: i16) -> anyhow::Result<Rating>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// All reviews of a movie in creation order.
    async fn list_for_movie(&self, movie: MovieId) -> anyhow::Result<Vec<Review>>;

    async fn exists(&self, id: ReviewId) -> anyhow::Result<bool>;

    async fn create(&self, review: NewReview) -> anyhow::Result<Review>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ActorRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<ActorSummary>>;

    async fn get(&self, id: ActorId) -> anyhow::Result<Option<Actor>>;
}
