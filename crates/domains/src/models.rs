//! # Domain Models
//!
//! These structs represent the core entities of the movie catalog.
//! Identifiers are the store's integer primary keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type MovieId = i64;
pub type ActorId = i64;
pub type CategoryId = i64;
pub type GenreId = i64;
pub type ReviewId = i64;
pub type RatingId = i64;

/// A top-level grouping of movies (e.g. "Films", "Series").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub description: String,
    /// The URL slug (e.g. "films")
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub title: String,
    pub description: String,
    pub slug: String,
}

/// A person credited on a movie, either as director or actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub age: i16,
    pub description: String,
    /// Path of the portrait handled by the media store
    pub image: String,
}

/// The short form of an [`Actor`] used in listings and movie credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSummary {
    pub id: ActorId,
    pub name: String,
    pub image: String,
}

impl From<&Actor> for ActorSummary {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.name.clone(),
            image: actor.image.clone(),
        }
    }
}

/// A movie row without its many-to-many relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub poster: String,
    pub year: i16,
    pub country: String,
    pub world_premiere: NaiveDate,
    /// All money amounts are in US dollars
    pub budget: i64,
    pub fees_in_usa: i64,
    pub fees_in_world: i64,
    pub category_id: Option<CategoryId>,
    pub slug: String,
    /// Unpublished movies are hidden from every public read path.
    pub draft: bool,
}

/// A published movie together with the relations its detail view needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub movie: Movie,
    pub category: Option<String>,
    pub directors: Vec<ActorSummary>,
    pub actors: Vec<ActorSummary>,
    pub genres: Vec<String>,
}

/// Query parameters accepted by the movie listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    pub year_min: Option<i16>,
    pub year_max: Option<i16>,
    /// Matches movies that carry any of these genre titles.
    pub genres: Vec<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl MovieFilter {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Year range and genre predicate; pagination is applied separately.
    pub fn matches(&self, movie: &Movie, genre_titles: &[String]) -> bool {
        if self.year_min.is_some_and(|min| movie.year < min) {
            return false;
        }
        if self.year_max.is_some_and(|max| movie.year > max) {
            return false;
        }
        self.genres.is_empty() || genre_titles.iter().any(|g| self.genres.contains(g))
    }
}

/// One row of the public movie listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieListItem {
    pub id: MovieId,
    pub title: String,
    pub tagline: String,
    pub category: Option<CategoryId>,
    /// Whether the requesting visitor has already rated this movie
    pub rating_user: bool,
    /// Mean star value, absent while the movie has no ratings
    pub middle_star: Option<f64>,
}

/// Full public view of a movie. `draft` is never exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetail {
    pub id: MovieId,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub poster: String,
    pub year: i16,
    pub country: String,
    pub world_premiere: NaiveDate,
    pub budget: i64,
    pub fees_in_usa: i64,
    pub fees_in_world: i64,
    pub category: Option<String>,
    pub slug: String,
    pub directors: Vec<ActorSummary>,
    pub actors: Vec<ActorSummary>,
    pub genres: Vec<String>,
    pub reviews: Vec<ReviewNode>,
}

impl MovieDetail {
    pub fn new(record: MovieRecord, reviews: Vec<ReviewNode>) -> Self {
        let MovieRecord {
            movie,
            category,
            directors,
            actors,
            genres,
        } = record;
        Self {
            id: movie.id,
            title: movie.title,
            tagline: movie.tagline,
            description: movie.description,
            poster: movie.poster,
            year: movie.year,
            country: movie.country,
            world_premiere: movie.world_premiere,
            budget: movie.budget,
            fees_in_usa: movie.fees_in_usa,
            fees_in_world: movie.fees_in_world,
            category,
            slug: movie.slug,
            directors,
            actors,
            genres,
            reviews,
        }
    }
}

/// A visitor's star rating of a movie. Unique per `(movie, ip)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    /// Resolved client address; a weak identity proxy, not an account
    pub ip: String,
    pub star: i16,
    pub movie: MovieId,
}

/// A user review. `parent` links a reply to the review it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub name: String,
    pub email: String,
    pub text: String,
    pub parent: Option<ReviewId>,
    pub movie: MovieId,
}

/// A review as submitted, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewReview {
    pub name: String,
    pub email: String,
    pub text: String,
    #[serde(default)]
    pub parent: Option<ReviewId>,
    pub movie: MovieId,
}

/// Serialized shape of a review thread: a node holding its replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewNode {
    pub name: String,
    pub text: String,
    pub children: Vec<ReviewNode>,
}

impl ReviewNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ReviewNode::size).sum::<usize>()
    }
}
