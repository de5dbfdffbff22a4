use super::{QaStore, StoreTx};
use crate::domain::AcceptResult;
use crate::infrastructure::security::{InFlight, InFlightKey};
use qa_errors::AppError;
use uuid::Uuid;

/// Marks one answer as the accepted resolution of its question. Clearing
/// the siblings, flagging the target and moving the question's pointer
/// happen in a single transaction.
pub struct AcceptAnswer<S> {
    store: S,
    in_flight: InFlight,
}

impl<S: QaStore> AcceptAnswer<S> {
    pub fn new(store: S, in_flight: InFlight) -> Self {
        Self { store, in_flight }
    }

    pub async fn execute(
        &self,
        caller_id: Option<Uuid>,
        question_id: Uuid,
        answer_id: Uuid,
    ) -> Result<AcceptResult, AppError> {
        let caller_id = caller_id.ok_or(AppError::Unauthenticated)?;
        let _guard = self.in_flight.acquire(InFlightKey::Accept {
            user_id: caller_id,
            question_id,
        })?;

        let mut tx = self.store.begin().await?;

        let question = tx
            .find_question(question_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("question {}", question_id)))?;

        if !question.is_author(caller_id) {
            tracing::warn!(%caller_id, %question_id, "Non-author tried to accept an answer");
            return Err(AppError::Forbidden(
                "only the question author can accept an answer".to_string(),
            ));
        }

        let answer = tx
            .find_answer(answer_id)
            .await?
            .filter(|a| a.question_id == question_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("answer {} on question {}", answer_id, question_id))
            })?;

        if answer.is_accepted && question.accepted_answer_id == Some(answer_id) {
            return Ok(AcceptResult {
                question_id,
                accepted_answer_id: answer_id,
                changed: false,
            });
        }

        tx.clear_accepted_for_question(question_id, answer_id).await?;
        tx.set_answer_accepted(answer_id, true).await?;
        tx.set_question_accepted_answer(question_id, Some(answer_id))
            .await?;
        tx.commit().await?;

        tracing::info!(
            %question_id,
            %answer_id,
            previous = ?question.accepted_answer_id,
            "Answer accepted"
        );

        Ok(AcceptResult {
            question_id,
            accepted_answer_id: answer_id,
            changed: true,
        })
    }
}
