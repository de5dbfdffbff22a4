use super::entities::{vote, Vote};
use crate::domain::VoteDirection;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, PaginatorTrait};
use uuid::Uuid;

/// Vote rows. Works on a pooled connection or inside a transaction.
pub struct VoteRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> VoteRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find(&self, user_id: Uuid, answer_id: Uuid) -> Result<Option<vote::Model>, DbErr> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::AnswerId.eq(answer_id))
            .one(self.db)
            .await
    }

    pub async fn find_for_answers(
        &self,
        user_id: Uuid,
        answer_ids: &[Uuid],
    ) -> Result<Vec<vote::Model>, DbErr> {
        if answer_ids.is_empty() {
            return Ok(Vec::new());
        }
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::AnswerId.is_in(answer_ids.iter().copied()))
            .all(self.db)
            .await
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        answer_id: Uuid,
        direction: VoteDirection,
    ) -> Result<vote::Model, DbErr> {
        let active = vote::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            answer_id: Set(answer_id),
            vote_type: Set(direction.as_str().to_string()),
            created_at: Set(Some(chrono::Utc::now())),
        };
        active.insert(self.db).await
    }

    pub async fn set_direction(&self, vote_id: Uuid, direction: VoteDirection) -> Result<(), DbErr> {
        let result = Vote::update_many()
            .col_expr(
                vote::Column::VoteType,
                sea_orm::sea_query::Expr::value(direction.as_str()),
            )
            .filter(vote::Column::Id.eq(vote_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("vote {}", vote_id)));
        }
        Ok(())
    }

    pub async fn delete(&self, vote_id: Uuid) -> Result<(), DbErr> {
        let result = Vote::delete_by_id(vote_id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("vote {}", vote_id)));
        }
        Ok(())
    }

    /// Score of an answer computed from its vote rows.
    pub async fn tally(&self, answer_id: Uuid) -> Result<i32, DbErr> {
        let up = self.count_direction(answer_id, VoteDirection::Up).await?;
        let down = self.count_direction(answer_id, VoteDirection::Down).await?;
        i32::try_from(up as i64 - down as i64)
            .map_err(|_| DbErr::Custom(format!("vote score of {} out of range", answer_id)))
    }

    async fn count_direction(&self, answer_id: Uuid, direction: VoteDirection) -> Result<u64, DbErr> {
        Vote::find()
            .filter(vote::Column::AnswerId.eq(answer_id))
            .filter(vote::Column::VoteType.eq(direction.as_str()))
            .count(self.db)
            .await
    }
}
