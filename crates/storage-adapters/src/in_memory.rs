//! # In-memory catalog
//!
//! A `DashMap`-backed implementation of every repository port. Used by the
//! server when `storage.backend = "memory"` and by the test suites.
//!
//! Ratings are keyed by `(movie, ip)`, so the map's entry lock serializes
//! concurrent writers for the same key and the upsert can never produce a
//! second row.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{
    Actor, ActorId, ActorRepository, ActorSummary, Category, CategoryId, Genre, GenreId, Movie,
    MovieFilter, MovieId, MovieListItem, MovieRecord, MovieRepository, NewReview, Rating,
    RatingRepository, RatingSummary, Review, ReviewId, ReviewRepository,
};

/// A movie row plus the ids of its many-to-many relations, in credit order.
#[derive(Debug, Clone)]
struct StoredMovie {
    movie: Movie,
    directors: Vec<ActorId>,
    actors: Vec<ActorId>,
    genres: Vec<GenreId>,
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    categories: DashMap<CategoryId, Category>,
    genres: DashMap<GenreId, Genre>,
    actors: DashMap<ActorId, Actor>,
    movies: DashMap<MovieId, StoredMovie>,
    ratings: DashMap<(MovieId, String), Rating>,
    reviews: DashMap<ReviewId, Review>,
    rating_seq: AtomicI64,
    review_seq: AtomicI64,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, category: Category) {
        self.categories.insert(category.id, category);
    }

    pub fn add_genre(&self, genre: Genre) {
        self.genres.insert(genre.id, genre);
    }

    pub fn add_actor(&self, actor: Actor) {
        self.actors.insert(actor.id, actor);
    }

    /// Inserts or replaces a movie together with its credits and genres.
    pub fn add_movie(
        &self,
        movie: Movie,
        directors: &[ActorId],
        actors: &[ActorId],
        genres: &[GenreId],
    ) {
        self.movies.insert(
            movie.id,
            StoredMovie {
                movie,
                directors: directors.to_vec(),
                actors: actors.to_vec(),
                genres: genres.to_vec(),
            },
        );
    }

    /// Every rating row of a movie, ordered by id.
    pub fn ratings_of(&self, movie: MovieId) -> Vec<Rating> {
        let mut rows: Vec<Rating> = self
            .ratings
            .iter()
            .filter(|entry| entry.key().0 == movie)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|r| r.id);
        rows
    }

    fn summarize(&self, movie: MovieId, visitor_ip: &str) -> RatingSummary {
        let rows = self.ratings_of(movie);
        RatingSummary::collect(rows.iter().map(|r| (r.ip.as_str(), r.star)), visitor_ip)
    }

    fn genre_titles(&self, ids: &[GenreId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.genres.get(id).map(|g| g.title.clone()))
            .collect()
    }

    fn actor_summaries(&self, ids: &[ActorId]) -> Vec<ActorSummary> {
        ids.iter()
            .filter_map(|id| self.actors.get(id).map(|a| ActorSummary::from(a.value())))
            .collect()
    }

    fn published(&self, id: MovieId) -> Option<StoredMovie> {
        self.movies
            .get(&id)
            .filter(|stored| !stored.movie.draft)
            .map(|stored| stored.value().clone())
    }
}

#[async_trait]
impl MovieRepository for InMemoryCatalog {
    async fn list_published(
        &self,
        filter: &MovieFilter,
        visitor_ip: &str,
    ) -> anyhow::Result<Vec<MovieListItem>> {
        let mut matching: Vec<StoredMovie> = self
            .movies
            .iter()
            .filter(|stored| !stored.movie.draft)
            .map(|stored| stored.value().clone())
            .collect();
        matching.retain(|stored| filter.matches(&stored.movie, &self.genre_titles(&stored.genres)));
        matching.sort_by_key(|stored| stored.movie.id);

        let offset = usize::try_from(filter.offset())?;
        let limit = usize::try_from(filter.limit())?;
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|stored| {
                let summary = self.summarize(stored.movie.id, visitor_ip);
                MovieListItem {
                    id: stored.movie.id,
                    title: stored.movie.title,
                    tagline: stored.movie.tagline,
                    category: stored.movie.category_id,
                    rating_user: summary.has_rated,
                    middle_star: summary.mean_star,
                }
            })
            .collect())
    }

    async fn find_published(&self, id: MovieId) -> anyhow::Result<Option<MovieRecord>> {
        let Some(stored) = self.published(id) else {
            return Ok(None);
        };
        let category = stored
            .movie
            .category_id
            .and_then(|c| self.categories.get(&c).map(|c| c.title.clone()));
        Ok(Some(MovieRecord {
            category,
            directors: self.actor_summaries(&stored.directors),
            actors: self.actor_summaries(&stored.actors),
            genres: self.genre_titles(&stored.genres),
            movie: stored.movie,
        }))
    }

    async fn is_published(&self, id: MovieId) -> anyhow::Result<bool> {
        Ok(self.published(id).is_some())
    }
}

#[async_trait]
impl RatingRepository for InMemoryCatalog {
    async fn summary(&self, movie: MovieId, visitor_ip: &str) -> anyhow::Result<RatingSummary> {
        Ok(self.summarize(movie, visitor_ip))
    }

    async fn upsert(&self, movie: MovieId, ip: &str, star: i16) -> anyhow::Result<Rating> {
        let rating = self
            .ratings
            .entry((movie, ip.to_string()))
            .and_modify(|existing| existing.star = star)
            .or_insert_with(|| Rating {
                id: self.rating_seq.fetch_add(1, Ordering::Relaxed) + 1,
                ip: ip.to_string(),
                star,
                movie,
            })
            .value()
            .clone();
        Ok(rating)
    }
}

#[async_trait]
impl ReviewRepository for InMemoryCatalog {
    async fn list_for_movie(&self, movie: MovieId) -> anyhow::Result<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|review| review.movie == movie)
            .map(|review| review.value().clone())
            .collect();
        reviews.sort_by_key(|r| r.id);
        Ok(reviews)
    }

    async fn exists(&self, id: ReviewId) -> anyhow::Result<bool> {
        Ok(self.reviews.contains_key(&id))
    }

    async fn create(&self, review: NewReview) -> anyhow::Result<Review> {
        let id = self.review_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let review = Review {
            id,
            name: review.name,
            email: review.email,
            text: review.text,
            parent: review.parent,
            movie: review.movie,
        };
        self.reviews.insert(id, review.clone());
        Ok(review)
    }
}

#[async_trait]
impl ActorRepository for InMemoryCatalog {
    async fn list(&self) -> anyhow::Result<Vec<ActorSummary>> {
        let mut actors: Vec<ActorSummary> = self
            .actors
            .iter()
            .map(|actor| ActorSummary::from(actor.value()))
            .collect();
        actors.sort_by_key(|a| a.id);
        Ok(actors)
    }

    async fn get(&self, id: ActorId) -> anyhow::Result<Option<Actor>> {
        Ok(self.actors.get(&id).map(|actor| actor.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;

    fn movie(id: MovieId, year: i16, draft: bool) -> Movie {
        Movie {
            id,
            title: format!("Movie {id}"),
            tagline: format!("Tagline {id}"),
            description: String::new(),
            poster: format!("movies/{id}.jpg"),
            year,
            country: "USA".into(),
            world_premiere: NaiveDate::from_ymd_opt(i32::from(year), 1, 1).unwrap(),
            budget: 0,
            fees_in_usa: 0,
            fees_in_world: 0,
            category_id: Some(1),
            slug: format!("movie-{id}"),
            draft,
        }
    }

    fn catalog() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        catalog.add_category(Category {
            id: 1,
            title: "Films".into(),
            description: String::new(),
            slug: "films".into(),
        });
        for (id, title) in [(1, "Drama"), (2, "Comedy")] {
            catalog.add_genre(Genre {
                id,
                title: title.into(),
                description: String::new(),
                slug: title.to_lowercase(),
            });
        }
        catalog.add_actor(Actor {
            id: 1,
            name: "Director".into(),
            age: 60,
            description: String::new(),
            image: "actors/1.jpg".into(),
        });
        catalog.add_movie(movie(1, 1999, false), &[1], &[], &[1]);
        catalog.add_movie(movie(2, 2005, false), &[], &[1], &[2]);
        catalog.add_movie(movie(3, 2010, true), &[], &[], &[1]);
        catalog
    }

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let catalog = catalog();
        let first = catalog.upsert(1, "1.2.3.4", 5).await.unwrap();
        let second = catalog.upsert(1, "1.2.3.4", 8).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.star, 8);
        assert_eq!(catalog.ratings_of(1).len(), 1);

        let summary = catalog.summary(1, "1.2.3.4").await.unwrap();
        assert!(summary.has_rated);
        assert_eq!(summary.mean_star, Some(8.0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_upserts_from_one_ip_leave_one_row() {
        let catalog = Arc::new(catalog());
        let writers: Vec<_> = (1..=10)
            .map(|star| {
                let catalog = Arc::clone(&catalog);
                tokio::spawn(async move { catalog.upsert(1, "10.0.0.1", star).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let rows = catalog.ratings_of(1);
        assert_eq!(rows.len(), 1);
        assert!((1..=10).contains(&rows[0].star));
    }

    #[tokio::test]
    async fn list_hides_drafts_and_annotates_the_visitor() {
        let catalog = catalog();
        catalog.upsert(2, "1.1.1.1", 4).await.unwrap();
        catalog.upsert(2, "2.2.2.2", 9).await.unwrap();

        let items = catalog
            .list_published(&MovieFilter::default(), "2.2.2.2")
            .await
            .unwrap();
        let ids: Vec<_> = items.iter().map(|m| m.id).collect();
        assert_eq!(ids, [1, 2]);

        assert!(!items[0].rating_user);
        assert_eq!(items[0].middle_star, None);
        assert!(items[1].rating_user);
        assert_eq!(items[1].middle_star, Some(6.5));
    }

    #[tokio::test]
    async fn list_applies_filter_and_pagination() {
        let catalog = catalog();
        let by_genre = MovieFilter {
            genres: vec!["Comedy".into()],
            ..Default::default()
        };
        let items = catalog.list_published(&by_genre, "x").await.unwrap();
        assert_eq!(items.iter().map(|m| m.id).collect::<Vec<_>>(), [2]);

        let by_year = MovieFilter {
            year_max: Some(2000),
            ..Default::default()
        };
        let items = catalog.list_published(&by_year, "x").await.unwrap();
        assert_eq!(items.iter().map(|m| m.id).collect::<Vec<_>>(), [1]);

        let second_page = MovieFilter {
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        };
        let items = catalog.list_published(&second_page, "x").await.unwrap();
        assert_eq!(items.iter().map(|m| m.id).collect::<Vec<_>>(), [2]);
    }

    #[tokio::test]
    async fn find_published_resolves_relations() {
        let catalog = catalog();
        let record = catalog.find_published(1).await.unwrap().unwrap();
        assert_eq!(record.category.as_deref(), Some("Films"));
        assert_eq!(record.directors[0].name, "Director");
        assert!(record.actors.is_empty());
        assert_eq!(record.genres, ["Drama"]);

        assert!(catalog.find_published(3).await.unwrap().is_none());
        assert!(catalog.find_published(42).await.unwrap().is_none());
        assert!(!catalog.is_published(3).await.unwrap());
    }

    #[tokio::test]
    async fn reviews_come_back_in_creation_order() {
        let catalog = catalog();
        for text in ["first", "second", "third"] {
            catalog
                .create(NewReview {
                    name: "n".into(),
                    email: "n@example.com".into(),
                    text: text.into(),
                    parent: None,
                    movie: 1,
                })
                .await
                .unwrap();
        }
        let texts: Vec<_> = catalog
            .list_for_movie(1)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert!(catalog.exists(1).await.unwrap());
        assert!(!catalog.exists(4).await.unwrap());
    }
}
