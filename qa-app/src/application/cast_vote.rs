use super::{QaStore, StoreTx};
use crate::domain::{VoteAction, VoteDirection, VoteResult};
use crate::infrastructure::security::{InFlight, InFlightKey};
use qa_errors::AppError;
use uuid::Uuid;

/// Casts, switches or retracts a user's vote on an answer and keeps the
/// answer's `vote_score` in step with its votes.
pub struct CastVote<S> {
    store: S,
    in_flight: InFlight,
}

impl<S: QaStore> CastVote<S> {
    pub fn new(store: S, in_flight: InFlight) -> Self {
        Self { store, in_flight }
    }

    pub async fn execute(
        &self,
        voter_id: Option<Uuid>,
        answer_id: Uuid,
        direction: VoteDirection,
    ) -> Result<VoteResult, AppError> {
        let voter_id = voter_id.ok_or(AppError::Unauthenticated)?;
        let _guard = self.in_flight.acquire(InFlightKey::Vote {
            user_id: voter_id,
            answer_id,
        })?;

        let mut tx = self.store.begin().await?;

        if tx.find_answer(answer_id).await?.is_none() {
            return Err(AppError::NotFound(format!("answer {}", answer_id)));
        }

        let (action, user_vote) = match tx.find_vote(voter_id, answer_id).await? {
            None => {
                tx.create_vote(voter_id, answer_id, direction).await?;
                (VoteAction::Cast, Some(direction))
            }
            Some(vote) if vote.direction == direction => {
                tx.delete_vote(vote.id).await?;
                (VoteAction::Retracted, None)
            }
            Some(vote) => {
                tx.update_vote(vote.id, direction).await?;
                (VoteAction::Switched, Some(direction))
            }
        };

        let vote_score = tx.refresh_vote_score(answer_id).await?;
        tx.commit().await?;

        tracing::info!(
            %voter_id,
            %answer_id,
            ?action,
            vote_score,
            "Vote recorded"
        );

        Ok(VoteResult {
            action,
            user_vote,
            vote_score,
        })
    }
}
