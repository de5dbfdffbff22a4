use super::entities::{answer, Answer};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use uuid::Uuid;

pub struct AnswerRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AnswerRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<answer::Model>, DbErr> {
        Answer::find_by_id(id).one(self.db).await
    }

    /// Same as `find_by_id` but holds a row lock until the surrounding
    /// transaction ends, serialising concurrent votes on one answer.
    pub async fn find_for_update(&self, id: Uuid) -> Result<Option<answer::Model>, DbErr> {
        Answer::find_by_id(id).lock_exclusive().one(self.db).await
    }

    pub async fn list_for_question(&self, question_id: Uuid) -> Result<Vec<answer::Model>, DbErr> {
        Answer::find()
            .filter(answer::Column::QuestionId.eq(question_id))
            .order_by_desc(answer::Column::IsAccepted)
            .order_by_desc(answer::Column::VoteScore)
            .order_by_asc(answer::Column::CreatedAt)
            .all(self.db)
            .await
    }

    pub async fn create(&self, answer_data: &crate::domain::Answer) -> Result<answer::Model, DbErr> {
        let active = answer::ActiveModel {
            id: Set(answer_data.id),
            question_id: Set(answer_data.question_id),
            author_id: Set(answer_data.author_id),
            content: Set(answer_data.content.clone()),
            vote_score: Set(answer_data.vote_score),
            is_accepted: Set(answer_data.is_accepted),
            created_at: Set(Some(chrono::Utc::now())),
        };
        active.insert(self.db).await
    }

    pub async fn set_vote_score(&self, id: Uuid, score: i32) -> Result<(), DbErr> {
        let result = Answer::update_many()
            .col_expr(answer::Column::VoteScore, Expr::value(score))
            .filter(answer::Column::Id.eq(id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("answer {}", id)));
        }
        Ok(())
    }

    pub async fn set_accepted(&self, id: Uuid, accepted: bool) -> Result<(), DbErr> {
        let result = Answer::update_many()
            .col_expr(answer::Column::IsAccepted, Expr::value(accepted))
            .filter(answer::Column::Id.eq(id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("answer {}", id)));
        }
        Ok(())
    }

    pub async fn clear_accepted_except(&self, question_id: Uuid, except_id: Uuid) -> Result<u64, DbErr> {
        let result = Answer::update_many()
            .col_expr(answer::Column::IsAccepted, Expr::value(false))
            .filter(answer::Column::QuestionId.eq(question_id))
            .filter(answer::Column::Id.ne(except_id))
            .filter(answer::Column::IsAccepted.eq(true))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
