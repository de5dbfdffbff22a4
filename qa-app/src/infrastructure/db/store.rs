use super::error::map_db_err;
use super::{AnswerRepository, QuestionRepository, VoteRepository};
use crate::application::{QaStore, StoreTx};
use crate::domain::{Answer, Question, Vote, VoteDirection};
use async_trait::async_trait;
use qa_errors::AppError;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use uuid::Uuid;

/// Relational store. Every read-then-write goes through a database
/// transaction; rows read inside one are locked until commit.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QaStore for SeaOrmStore {
    type Tx = SeaOrmTx;

    async fn begin(&self) -> Result<SeaOrmTx, AppError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        Ok(SeaOrmTx { txn })
    }

    async fn find_question(&self, id: Uuid) -> Result<Option<Question>, AppError> {
        let questions = QuestionRepository::new(&self.db);
        let Some(row) = questions.find_by_id(id).await.map_err(map_db_err)? else {
            return Ok(None);
        };
        let tag_ids = questions.tag_ids(id).await.map_err(map_db_err)?;
        Ok(Some(row.into_domain(tag_ids)))
    }

    async fn find_answer(&self, id: Uuid) -> Result<Option<Answer>, AppError> {
        let found = AnswerRepository::new(&self.db)
            .find_by_id(id)
            .await
            .map_err(map_db_err)?;
        Ok(found.map(Into::into))
    }

    async fn list_answers(&self, question_id: Uuid) -> Result<Vec<Answer>, AppError> {
        let rows = AnswerRepository::new(&self.db)
            .list_for_question(question_id)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn votes_by_user(&self, user_id: Uuid, answer_ids: &[Uuid]) -> Result<Vec<Vote>, AppError> {
        VoteRepository::new(&self.db)
            .find_for_answers(user_id, answer_ids)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(Vote::try_from)
            .collect()
    }

    async fn answer_vote_score(&self, answer_id: Uuid) -> Result<i32, AppError> {
        AnswerRepository::new(&self.db)
            .find_by_id(answer_id)
            .await
            .map_err(map_db_err)?
            .map(|a| a.vote_score)
            .ok_or_else(|| AppError::NotFound(format!("answer {}", answer_id)))
    }

    async fn insert_question(&self, question: &Question) -> Result<Question, AppError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let row = QuestionRepository::new(&txn)
            .create(question)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;
        Ok(row.into_domain(question.tag_ids.clone()))
    }

    async fn insert_answer(&self, answer: &Answer) -> Result<Answer, AppError> {
        let row = AnswerRepository::new(&self.db)
            .create(answer)
            .await
            .map_err(map_db_err)?;
        Ok(row.into())
    }

    async fn increment_view_count(&self, question_id: Uuid) -> Result<i64, AppError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let questions = QuestionRepository::new(&txn);
        questions
            .increment_view_count(question_id)
            .await
            .map_err(map_db_err)?;
        let count = questions
            .find_by_id(question_id)
            .await
            .map_err(map_db_err)?
            .map(|q| q.view_count)
            .ok_or_else(|| AppError::NotFound(format!("question {}", question_id)))?;
        txn.commit().await.map_err(map_db_err)?;
        Ok(count)
    }
}

pub struct SeaOrmTx {
    txn: DatabaseTransaction,
}

#[async_trait]
impl StoreTx for SeaOrmTx {
    async fn find_question(&mut self, id: Uuid) -> Result<Option<Question>, AppError> {
        let questions = QuestionRepository::new(&self.txn);
        let Some(row) = questions.find_for_update(id).await.map_err(map_db_err)? else {
            return Ok(None);
        };
        let tag_ids = questions.tag_ids(id).await.map_err(map_db_err)?;
        Ok(Some(row.into_domain(tag_ids)))
    }

    async fn find_answer(&mut self, id: Uuid) -> Result<Option<Answer>, AppError> {
        let found = AnswerRepository::new(&self.txn)
            .find_for_update(id)
            .await
            .map_err(map_db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_vote(&mut self, user_id: Uuid, answer_id: Uuid) -> Result<Option<Vote>, AppError> {
        VoteRepository::new(&self.txn)
            .find(user_id, answer_id)
            .await
            .map_err(map_db_err)?
            .map(Vote::try_from)
            .transpose()
    }

    async fn create_vote(
        &mut self,
        user_id: Uuid,
        answer_id: Uuid,
        direction: VoteDirection,
    ) -> Result<Vote, AppError> {
        let row = VoteRepository::new(&self.txn)
            .create(user_id, answer_id, direction)
            .await
            .map_err(map_db_err)?;
        Vote::try_from(row)
    }

    async fn update_vote(&mut self, vote_id: Uuid, direction: VoteDirection) -> Result<(), AppError> {
        VoteRepository::new(&self.txn)
            .set_direction(vote_id, direction)
            .await
            .map_err(map_db_err)
    }

    async fn delete_vote(&mut self, vote_id: Uuid) -> Result<(), AppError> {
        VoteRepository::new(&self.txn)
            .delete(vote_id)
            .await
            .map_err(map_db_err)
    }

    async fn refresh_vote_score(&mut self, answer_id: Uuid) -> Result<i32, AppError> {
        let score = VoteRepository::new(&self.txn)
            .tally(answer_id)
            .await
            .map_err(map_db_err)?;
        AnswerRepository::new(&self.txn)
            .set_vote_score(answer_id, score)
            .await
            .map_err(map_db_err)?;
        Ok(score)
    }

    async fn set_answer_accepted(&mut self, answer_id: Uuid, accepted: bool) -> Result<(), AppError> {
        AnswerRepository::new(&self.txn)
            .set_accepted(answer_id, accepted)
            .await
            .map_err(map_db_err)
    }

    async fn clear_accepted_for_question(
        &mut self,
        question_id: Uuid,
        except_answer_id: Uuid,
    ) -> Result<(), AppError> {
        let cleared = AnswerRepository::new(&self.txn)
            .clear_accepted_except(question_id, except_answer_id)
            .await
            .map_err(map_db_err)?;
        if cleared > 0 {
            tracing::debug!(%question_id, cleared, "Cleared previously accepted answers");
        }
        Ok(())
    }

    async fn set_question_accepted_answer(
        &mut self,
        question_id: Uuid,
        answer_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        QuestionRepository::new(&self.txn)
            .set_accepted_answer(question_id, answer_id)
            .await
            .map_err(map_db_err)
    }

    async fn commit(self) -> Result<(), AppError> {
        self.txn.commit().await.map_err(map_db_err)
    }
}
