//! # Postgres catalog
//!
//! This module implements the data mapping between the Postgres relational
//! model and the `domains` models.

use anyhow::Context;
use async_trait::async_trait;
use domains::{
    Actor, ActorId, ActorRepository, ActorSummary, Movie, MovieFilter, MovieId, MovieListItem,
    MovieRecord, MovieRepository, NewReview, Rating, RatingRepository, RatingSummary, Review,
    ReviewId, ReviewRepository, StarScale,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("failed to connect to postgres")?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run migrations")?;
        Ok(())
    }

    /// Makes every configured star value available to the `ratings` foreign key.
    pub async fn sync_star_scale(&self, scale: &StarScale) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO rating_stars (value) SELECT UNNEST($1::SMALLINT[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(scale.values())
        .execute(&self.pool)
        .await?;
        tracing::debug!(values = ?scale.values(), "rating stars synced");
        Ok(())
    }

    async fn credits(&self, table: Credit, movie: MovieId) -> anyhow::Result<Vec<ActorSummary>> {
        let sql = format!(
            "SELECT a.id, a.name, a.image FROM actors a \
             JOIN {} c ON c.actor_id = a.id \
             WHERE c.movie_id = $1 ORDER BY a.id",
            table.as_str()
        );
        let rows = sqlx::query(&sql).bind(movie).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_actor_summary).collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Credit {
    Directors,
    Actors,
}

impl Credit {
    fn as_str(self) -> &'static str {
        match self {
            Credit::Directors => "movie_directors",
            Credit::Actors => "movie_actors",
        }
    }
}

const MOVIE_COLUMNS: &str = "m.id, m.title, m.tagline, m.description, m.poster, m.year, \
     m.country, m.world_premiere, m.budget, m.fees_in_usa, m.fees_in_world, m.category_id, \
     m.slug, m.draft";

fn row_to_movie(row: &PgRow) -> anyhow::Result<Movie> {
    Ok(Movie {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        tagline: row.try_get("tagline")?,
        description: row.try_get("description")?,
        poster: row.try_get("poster")?,
        year: row.try_get("year")?,
        country: row.try_get("country")?,
        world_premiere: row.try_get("world_premiere")?,
        budget: row.try_get("budget")?,
        fees_in_usa: row.try_get("fees_in_usa")?,
        fees_in_world: row.try_get("fees_in_world")?,
        category_id: row.try_get("category_id")?,
        slug: row.try_get("slug")?,
        draft: row.try_get("draft")?,
    })
}

fn row_to_actor_summary(row: &PgRow) -> anyhow::Result<ActorSummary> {
    Ok(ActorSummary {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        image: row.try_get("image")?,
    })
}

fn row_to_rating(row: &PgRow) -> anyhow::Result<Rating> {
    Ok(Rating {
        id: row.try_get("id")?,
        ip: row.try_get("ip")?,
        star: row.try_get("star")?,
        movie: row.try_get("movie_id")?,
    })
}

fn row_to_review(row: &PgRow) -> anyhow::Result<Review> {
    Ok(Review {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        text: row.try_get("text")?,
        parent: row.try_get("parent_id")?,
        movie: row.try_get("movie_id")?,
    })
}

#[async_trait]
impl MovieRepository for PgCatalog {
    /// Listing and rating aggregation in one round trip.
    async fn list_published(
        &self,
        filter: &MovieFilter,
        visitor_ip: &str,
    ) -> anyhow::Result<Vec<MovieListItem>> {
        let rows = sqlx::query(
            "SELECT m.id, m.title, m.tagline, m.category_id, \
                    EXISTS (SELECT 1 FROM ratings r \
                            WHERE r.movie_id = m.id AND r.ip = $1) AS rating_user, \
                    (SELECT AVG(r.star)::DOUBLE PRECISION FROM ratings r \
                            WHERE r.movie_id = m.id) AS middle_star \
             FROM movies m \
             WHERE NOT m.draft \
               AND ($2::SMALLINT IS NULL OR m.year >= $2) \
               AND ($3::SMALLINT IS NULL OR m.year <= $3) \
               AND (CARDINALITY($4::TEXT[]) = 0 OR EXISTS ( \
                    SELECT 1 FROM movie_genres mg JOIN genres g ON g.id = mg.genre_id \
                    WHERE mg.movie_id = m.id AND g.title = ANY($4))) \
             ORDER BY m.id \
             LIMIT $5 OFFSET $6",
        )
        .bind(visitor_ip)
        .bind(filter.year_min)
        .bind(filter.year_max)
        .bind(filter.genres.as_slice())
        .bind(filter.limit())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(MovieListItem {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    tagline: row.try_get("tagline")?,
                    category: row.try_get("category_id")?,
                    rating_user: row.try_get("rating_user")?,
                    middle_star: row.try_get("middle_star")?,
                })
            })
            .collect()
    }

    async fn find_published(&self, id: MovieId) -> anyhow::Result<Option<MovieRecord>> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS}, c.title AS category_title FROM movies m \
             LEFT JOIN categories c ON c.id = m.category_id \
             WHERE m.id = $1 AND NOT m.draft"
        );
        let Some(row) = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let movie = row_to_movie(&row)?;
        let category: Option<String> = row.try_get("category_title")?;
        let genres: Vec<String> = sqlx::query_scalar(
            "SELECT g.title FROM genres g JOIN movie_genres mg ON mg.genre_id = g.id \
             WHERE mg.movie_id = $1 ORDER BY g.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(MovieRecord {
            movie,
            category,
            directors: self.credits(Credit::Directors, id).await?,
            actors: self.credits(Credit::Actors, id).await?,
            genres,
        }))
    }

    async fn is_published(&self, id: MovieId) -> anyhow::Result<bool> {
        let published: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1 AND NOT draft)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(published)
    }
}

#[async_trait]
impl RatingRepository for PgCatalog {
    async fn summary(&self, movie: MovieId, visitor_ip: &str) -> anyhow::Result<RatingSummary> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM ratings WHERE movie_id = $1 AND ip = $2) AS has_rated, \
                    (SELECT AVG(star)::DOUBLE PRECISION FROM ratings \
                            WHERE movie_id = $1) AS mean_star",
        )
        .bind(movie)
        .bind(visitor_ip)
        .fetch_one(&self.pool)
        .await?;

        Ok(RatingSummary {
            has_rated: row.try_get("has_rated")?,
            mean_star: row.try_get("mean_star")?,
        })
    }

    /// Single-statement upsert; the `(movie_id, ip)` unique constraint
    /// arbitrates concurrent writers.
    async fn upsert(&self, movie: MovieId, ip: &str, star: i16) -> anyhow::Result<Rating> {
        let row = sqlx::query(
            "INSERT INTO ratings (movie_id, ip, star) VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT ratings_movie_ip_key DO UPDATE SET star = EXCLUDED.star \
             RETURNING id, ip, star, movie_id",
        )
        .bind(movie)
        .bind(ip)
        .bind(star)
        .fetch_one(&self.pool)
        .await?;
        row_to_rating(&row)
    }
}

#[async_trait]
impl ReviewRepository for PgCatalog {
    async fn list_for_movie(&self, movie: MovieId) -> anyhow::Result<Vec<Review>> {
        sqlx::query(
            "SELECT id, name, email, text, parent_id, movie_id FROM reviews \
             WHERE movie_id = $1 ORDER BY id",
        )
        .bind(movie)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(row_to_review)
        .collect()
    }

    async fn exists(&self, id: ReviewId) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM reviews WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, review: NewReview) -> anyhow::Result<Review> {
        let row = sqlx::query(
            "INSERT INTO reviews (name, email, text, parent_id, movie_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, text, parent_id, movie_id",
        )
        .bind(review.name)
        .bind(review.email)
        .bind(review.text)
        .bind(review.parent)
        .bind(review.movie)
        .fetch_one(&self.pool)
        .await?;
        row_to_review(&row)
    }
}

#[async_trait]
impl ActorRepository for PgCatalog {
    async fn list(&self) -> anyhow::Result<Vec<ActorSummary>> {
        sqlx::query("SELECT id, name, image FROM actors ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(row_to_actor_summary)
            .collect()
    }

    async fn get(&self, id: ActorId) -> anyhow::Result<Option<Actor>> {
        let row = sqlx::query("SELECT id, name, age, description, image FROM actors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Actor {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                age: row.try_get("age")?,
                description: row.try_get("description")?,
                image: row.try_get("image")?,
            })
        })
        .transpose()
    }
}
