//! Review submission.

use std::sync::Arc;

use domains::{AppError, MovieRepository, NewReview, Result, Review, ReviewRepository};

const MAX_NAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 254;
const MAX_TEXT_LEN: usize = 5000;

#[derive(Clone)]
pub struct ReviewService {
    movies: Arc<dyn MovieRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl ReviewService {
    pub fn new(movies: Arc<dyn MovieRepository>, reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { movies, reviews }
    }

    /// Validates and stores a review or a reply.
    ///
    /// The parent must exist, but it is not required to belong to the same
    /// movie.
    pub async fn submit(&self, review: NewReview) -> Result<Review> {
        validate(&review)?;

        if !self.movies.is_published(review.movie).await? {
            return Err(AppError::not_found("Movie", review.movie));
        }
        if let Some(parent) = review.parent {
            if !self.reviews.exists(parent).await? {
                return Err(AppError::Validation(format!(
                    "parent review {parent} does not exist"
                )));
            }
        }

        let review = self.reviews.create(review).await?;
        tracing::info!(
            movie_id = review.movie,
            review_id = review.id,
            parent = ?review.parent,
            "review submitted"
        );
        Ok(review)
    }
}

fn validate(review: &NewReview) -> Result<()> {
    if review.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    if review.name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if !is_plausible_email(review.email.trim()) {
        return Err(AppError::Validation("a valid email is required".into()));
    }
    if review.email.chars().count() > MAX_EMAIL_LEN {
        return Err(AppError::Validation(format!(
            "email must be at most {MAX_EMAIL_LEN} characters"
        )));
    }
    if review.text.trim().is_empty() {
        return Err(AppError::Validation("text is required".into()));
    }
    if review.text.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "text must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockMovieRepository, MockReviewRepository};
    use mockall::predicate::eq;

    fn new_review(parent: Option<i64>) -> NewReview {
        NewReview {
            name: "Kris".into(),
            email: "kris@example.com".into(),
            text: "The ocean remembers.".into(),
            parent,
            movie: 1,
        }
    }

    fn published() -> MockMovieRepository {
        let mut movies = MockMovieRepository::new();
        movies.expect_is_published().returning(|id| Ok(id == 1));
        movies
    }

    fn storing() -> MockReviewRepository {
        let mut reviews = MockReviewRepository::new();
        reviews.expect_create().times(1).returning(|r| {
            Ok(Review {
                id: 10,
                name: r.name,
                email: r.email,
                text: r.text,
                parent: r.parent,
                movie: r.movie,
            })
        });
        reviews
    }

    #[tokio::test]
    async fn submit_stores_a_top_level_review() {
        let service = ReviewService::new(Arc::new(published()), Arc::new(storing()));
        let review = service.submit(new_review(None)).await.unwrap();
        assert_eq!(review.id, 10);
        assert_eq!(review.parent, None);
    }

    #[tokio::test]
    async fn submit_checks_the_parent_exists() {
        let mut reviews = storing();
        reviews
            .expect_exists()
            .with(eq(4_i64))
            .times(1)
            .returning(|_| Ok(true));

        let service = ReviewService::new(Arc::new(published()), Arc::new(reviews));
        let review = service.submit(new_review(Some(4))).await.unwrap();
        assert_eq!(review.parent, Some(4));
    }

    #[tokio::test]
    async fn submit_rejects_unknown_parent() {
        let mut reviews = MockReviewRepository::new();
        reviews.expect_exists().returning(|_| Ok(false));
        reviews.expect_create().never();

        let service = ReviewService::new(Arc::new(published()), Arc::new(reviews));
        let err = service.submit(new_review(Some(4))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn submit_on_hidden_movie_is_not_found() {
        let mut reviews = MockReviewRepository::new();
        reviews.expect_create().never();

        let service = ReviewService::new(Arc::new(published()), Arc::new(reviews));
        let mut review = new_review(None);
        review.movie = 2;
        let err = service.submit(review).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected_before_any_lookup() {
        let mut movies = MockMovieRepository::new();
        movies.expect_is_published().never();
        let mut reviews = MockReviewRepository::new();
        reviews.expect_create().never();
        let service = ReviewService::new(Arc::new(movies), Arc::new(reviews));

        let cases = [
            NewReview { name: "  ".into(), ..new_review(None) },
            NewReview { name: "x".repeat(51), ..new_review(None) },
            NewReview { name: format!(" {} ", "x".repeat(49)), ..new_review(None) },
            NewReview { email: "not-an-email".into(), ..new_review(None) },
            NewReview { email: "a@b@c".into(), ..new_review(None) },
            NewReview { email: format!("{}@example.com", "a".repeat(300)), ..new_review(None) },
            NewReview { text: String::new(), ..new_review(None) },
            NewReview { text: "x".repeat(5001), ..new_review(None) },
        ];
        for case in cases {
            let err = service.submit(case).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }
}
