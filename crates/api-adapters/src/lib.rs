//! # api-adapters
//!
//! The JSON-over-HTTP layer of the movie catalog.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod visitor;

#[cfg(feature = "web-axum")]
pub use axum_app::{router, AppState};

#[cfg(feature = "web-axum")]
mod axum_app {
    use std::sync::Arc;

    use axum::routing::{get, post};
    use axum::Router;
    use domains::{ActorRepository, MovieRepository, RatingRepository, ReviewRepository, StarScale};
    use services::{ActorService, MovieService, RatingService, ReviewService};

    use crate::{handlers, middleware};

    /// Services shared by every request handler.
    #[derive(Clone)]
    pub struct AppState {
        pub movies: MovieService,
        pub ratings: RatingService,
        pub reviews: ReviewService,
        pub actors: ActorService,
    }

    impl AppState {
        /// Wires every service to one store implementing all the ports.
        pub fn new<R>(store: Arc<R>, scale: StarScale) -> Self
        where
            R: MovieRepository + RatingRepository + ReviewRepository + ActorRepository + 'static,
        {
            let movies: Arc<dyn MovieRepository> = store.clone();
            let ratings: Arc<dyn RatingRepository> = store.clone();
            let reviews: Arc<dyn ReviewRepository> = store.clone();
            let actors: Arc<dyn ActorRepository> = store;

            Self {
                movies: MovieService::new(movies.clone(), reviews.clone()),
                ratings: RatingService::new(movies.clone(), ratings, scale),
                reviews: ReviewService::new(movies, reviews),
                actors: ActorService::new(actors),
            }
        }
    }

    /// Builds the full application router, API mounted under `/api/v1`.
    pub fn router(state: AppState) -> Router {
        let api = Router::new()
            .route("/movies", get(handlers::list_movies))
            .route("/movies/{id}", get(handlers::movie_detail))
            .route("/movies/{id}/rating", get(handlers::movie_rating))
            .route("/reviews", post(handlers::create_review))
            .route("/ratings", post(handlers::create_rating))
            .route("/actors", get(handlers::list_actors))
            .route("/actors/{id}", get(handlers::actor_detail));

        let app = Router::new()
            .nest("/api/v1", api)
            .route("/healthz", get(handlers::health));

        middleware::apply(app).with_state(state)
    }
}
