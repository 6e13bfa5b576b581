//! Application services for the movie catalog.
//!
//! Each service owns the ports it needs as `Arc<dyn Port>` and is cheap to
//! clone into request handlers.

pub mod actor_service;
pub mod movie_service;
pub mod rating_service;
pub mod review_service;
pub mod review_tree;

pub use actor_service::ActorService;
pub use movie_service::MovieService;
pub use rating_service::RatingService;
pub use review_service::ReviewService;
