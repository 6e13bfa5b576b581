//! Prepares a Postgres database: runs migrations, installs the configured
//! star values and, with `--demo`, inserts a small sample catalog.

use anyhow::Context;
use chrono::NaiveDate;
use configs::Settings;
use domains::StarScale;
use storage_adapters::PgCatalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = Settings::load()?;
    let url = settings
        .database
        .url()
        .context("database.url must be set to seed")?;
    let scale = StarScale::new(settings.ratings.star_values.iter().copied())?;

    let catalog = PgCatalog::connect(url, 1).await?;
    catalog.migrate().await?;
    catalog.sync_star_scale(&scale).await?;
    tracing::info!(stars = ?scale.values(), "rating stars installed");

    if std::env::args().any(|arg| arg == "--demo") {
        seed_demo(&catalog).await?;
    }
    Ok(())
}

/// Inserts one category, genre, director and movie in a single transaction.
async fn seed_demo(catalog: &PgCatalog) -> anyhow::Result<()> {
    let mut tx = catalog.pool().begin().await?;

    let category: i64 = sqlx::query_scalar(
        "INSERT INTO categories (title, slug) VALUES ('Films', 'films') \
         ON CONFLICT (slug) DO UPDATE SET title = EXCLUDED.title RETURNING id",
    )
    .fetch_one(&mut *tx)
    .await?;

    let genre: i64 = sqlx::query_scalar(
        "INSERT INTO genres (title, slug) VALUES ('Sci-Fi', 'sci-fi') \
         ON CONFLICT (slug) DO UPDATE SET title = EXCLUDED.title RETURNING id",
    )
    .fetch_one(&mut *tx)
    .await?;

    // actors has no natural key; reuse the row from an earlier run.
    let director: i64 = sqlx::query_scalar(
        "WITH existing AS (SELECT id FROM actors WHERE name = $1 ORDER BY id LIMIT 1), \
              inserted AS ( \
                INSERT INTO actors (name, age, description, image) \
                SELECT $1, $2, $3, $4 WHERE NOT EXISTS (SELECT 1 FROM existing) \
                RETURNING id) \
         SELECT id FROM inserted UNION ALL SELECT id FROM existing",
    )
    .bind("Andrei Tarkovsky")
    .bind(54_i16)
    .bind("Soviet film director")
    .bind("actors/tarkovsky.jpg")
    .fetch_one(&mut *tx)
    .await?;

    let movie: i64 = sqlx::query_scalar(
        "INSERT INTO movies (title, tagline, description, poster, year, country, \
                             world_premiere, category_id, slug) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (slug) DO UPDATE SET title = EXCLUDED.title RETURNING id",
    )
    .bind("Solaris")
    .bind("The ocean remembers")
    .bind("A psychologist is sent to a station orbiting a strange planet.")
    .bind("movies/solaris.jpg")
    .bind(1972_i16)
    .bind("USSR")
    .bind(NaiveDate::from_ymd_opt(1972, 3, 20))
    .bind(category)
    .bind("solaris")
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO movie_directors (movie_id, actor_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(movie)
    .bind(director)
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        "INSERT INTO movie_genres (movie_id, genre_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(movie)
    .bind(genre)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(movie_id = movie, "demo catalog seeded");
    Ok(())
}
