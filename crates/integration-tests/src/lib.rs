//! Shared fixtures for the end-to-end test suites.

use std::sync::Arc;

use chrono::NaiveDate;
use domains::{Actor, Category, Genre, Movie, MovieId, StarScale};
use services::{MovieService, RatingService, ReviewService};
use storage_adapters::InMemoryCatalog;

pub const PUBLISHED: MovieId = 1;
pub const ALSO_PUBLISHED: MovieId = 2;
pub const DRAFT: MovieId = 3;

pub fn movie(id: MovieId, title: &str, year: i16, draft: bool) -> Movie {
    Movie {
        id,
        title: title.into(),
        tagline: String::new(),
        description: format!("About {title}"),
        poster: format!("movies/{id}.jpg"),
        year,
        country: "USA".into(),
        world_premiere: NaiveDate::from_ymd_opt(i32::from(year), 6, 1).expect("valid fixture date"),
        budget: 0,
        fees_in_usa: 0,
        fees_in_world: 0,
        category_id: Some(1),
        slug: title.to_lowercase().replace(' ', "-"),
        draft,
    }
}

/// Two published movies and one draft, all sharing a category and genre.
pub fn catalog() -> Arc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::new();
    catalog.add_category(Category {
        id: 1,
        title: "Films".into(),
        description: String::new(),
        slug: "films".into(),
    });
    catalog.add_genre(Genre {
        id: 1,
        title: "Drama".into(),
        description: String::new(),
        slug: "drama".into(),
    });
    catalog.add_actor(Actor {
        id: 1,
        name: "Liv Ullmann".into(),
        age: 85,
        description: String::new(),
        image: "actors/ullmann.jpg".into(),
    });
    catalog.add_movie(movie(PUBLISHED, "Persona", 1966, false), &[], &[1], &[1]);
    catalog.add_movie(movie(ALSO_PUBLISHED, "Cries and Whispers", 1972, false), &[], &[1], &[1]);
    catalog.add_movie(movie(DRAFT, "Unreleased", 2030, true), &[], &[], &[1]);
    Arc::new(catalog)
}

pub struct Services {
    pub store: Arc<InMemoryCatalog>,
    pub movies: MovieService,
    pub ratings: RatingService,
    pub reviews: ReviewService,
}

pub fn services(scale: StarScale) -> Services {
    let store = catalog();
    Services {
        movies: MovieService::new(store.clone(), store.clone()),
        ratings: RatingService::new(store.clone(), store.clone(), scale),
        reviews: ReviewService::new(store.clone(), store.clone()),
        store,
    }
}
