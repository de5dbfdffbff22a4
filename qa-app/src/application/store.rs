use crate::domain::{Answer, Question, Vote, VoteDirection};
use async_trait::async_trait;
use qa_errors::AppError;
use uuid::Uuid;

/// Data access boundary for the Q&A use cases.
///
/// Reads that need no consistency with a following write live here; every
/// read-then-write sequence goes through a [`StoreTx`] obtained from
/// [`QaStore::begin`].
#[async_trait]
pub trait QaStore: Send + Sync {
    type Tx: StoreTx;

    async fn begin(&self) -> Result<Self::Tx, AppError>;

    async fn find_question(&self, id: Uuid) -> Result<Option<Question>, AppError>;

    async fn find_answer(&self, id: Uuid) -> Result<Option<Answer>, AppError>;

    async fn list_answers(&self, question_id: Uuid) -> Result<Vec<Answer>, AppError>;

    async fn votes_by_user(&self, user_id: Uuid, answer_ids: &[Uuid]) -> Result<Vec<Vote>, AppError>;

    async fn answer_vote_score(&self, answer_id: Uuid) -> Result<i32, AppError>;

    /// Stores a question together with its tag assignments.
    async fn insert_question(&self, question: &Question) -> Result<Question, AppError>;

    async fn insert_answer(&self, answer: &Answer) -> Result<Answer, AppError>;

    /// Atomically bumps the view counter and returns the new value.
    async fn increment_view_count(&self, question_id: Uuid) -> Result<i64, AppError>;
}

/// One atomic unit of work. Dropping it without [`StoreTx::commit`] discards
/// every write made through it.
#[async_trait]
pub trait StoreTx: Send {
    async fn find_question(&mut self, id: Uuid) -> Result<Option<Question>, AppError>;

    async fn find_answer(&mut self, id: Uuid) -> Result<Option<Answer>, AppError>;

    async fn find_vote(&mut self, user_id: Uuid, answer_id: Uuid) -> Result<Option<Vote>, AppError>;

    async fn create_vote(
        &mut self,
        user_id: Uuid,
        answer_id: Uuid,
        direction: VoteDirection,
    ) -> Result<Vote, AppError>;

    async fn update_vote(&mut self, vote_id: Uuid, direction: VoteDirection) -> Result<(), AppError>;

    async fn delete_vote(&mut self, vote_id: Uuid) -> Result<(), AppError>;

    /// Recomputes `vote_score` from the answer's vote set, stores it and
    /// returns it.
    async fn refresh_vote_score(&mut self, answer_id: Uuid) -> Result<i32, AppError>;

    async fn set_answer_accepted(&mut self, answer_id: Uuid, accepted: bool) -> Result<(), AppError>;

    async fn clear_accepted_for_question(
        &mut self,
        question_id: Uuid,
        except_answer_id: Uuid,
    ) -> Result<(), AppError>;

    async fn set_question_accepted_answer(
        &mut self,
        question_id: Uuid,
        answer_id: Option<Uuid>,
    ) -> Result<(), AppError>;

    async fn commit(self) -> Result<(), AppError>;
}
