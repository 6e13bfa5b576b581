//! Actors and directors, read-only.

use std::sync::Arc;

use domains::{Actor, ActorId, ActorRepository, ActorSummary, AppError, Result};

#[derive(Clone)]
pub struct ActorService {
    actors: Arc<dyn ActorRepository>,
}

impl ActorService {
    pub fn new(actors: Arc<dyn ActorRepository>) -> Self {
        Self { actors }
    }

    pub async fn list(&self) -> Result<Vec<ActorSummary>> {
        Ok(self.actors.list().await?)
    }

    pub async fn detail(&self, id: ActorId) -> Result<Actor> {
        self.actors
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Actor", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockActorRepository;

    #[tokio::test]
    async fn detail_of_unknown_actor_is_not_found() {
        let mut actors = MockActorRepository::new();
        actors.expect_get().returning(|_| Ok(None));

        let err = ActorService::new(Arc::new(actors)).detail(3).await.unwrap_err();
        assert_eq!(err.to_string(), "Actor not found with ID 3");
    }

    #[tokio::test]
    async fn detail_returns_the_full_record() {
        let mut actors = MockActorRepository::new();
        actors.expect_get().returning(|id| {
            Ok(Some(Actor {
                id,
                name: "Donatas Banionis".into(),
                age: 90,
                description: String::new(),
                image: "actors/banionis.jpg".into(),
            }))
        });

        let actor = ActorService::new(Arc::new(actors)).detail(3).await.unwrap();
        assert_eq!(actor.id, 3);
        assert_eq!(actor.age, 90);
    }
}
