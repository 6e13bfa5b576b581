//! Public movie catalog: the filtered listing and the detail view.

use std::sync::Arc;

use domains::{
    AppError, MovieDetail, MovieFilter, MovieId, MovieListItem, MovieRepository, Result,
    ReviewRepository,
};

use crate::review_tree;

#[derive(Clone)]
pub struct MovieService {
    movies: Arc<dyn MovieRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl MovieService {
    pub fn new(movies: Arc<dyn MovieRepository>, reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { movies, reviews }
    }

    /// Published movies matching `filter`, each annotated for `visitor_ip`.
    pub async fn list(&self, filter: &MovieFilter, visitor_ip: &str) -> Result<Vec<MovieListItem>> {
        if let (Some(min), Some(max)) = (filter.year_min, filter.year_max) {
            if min > max {
                return Err(AppError::Validation(format!(
                    "year_min {min} is greater than year_max {max}"
                )));
            }
        }
        let movies = self.movies.list_published(filter, visitor_ip).await?;
        tracing::debug!(count = movies.len(), "movies listed");
        Ok(movies)
    }

    /// A published movie with its credits and threaded reviews.
    pub async fn detail(&self, id: MovieId) -> Result<MovieDetail> {
        let record = self
            .movies
            .find_published(id)
            .await?
            .ok_or_else(|| AppError::not_found("Movie", id))?;
        let reviews = self.reviews.list_for_movie(id).await?;
        Ok(MovieDetail::new(record, review_tree::project(&reviews)))
    }
}
