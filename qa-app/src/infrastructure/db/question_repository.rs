use super::entities::{question, question_tag, Question, QuestionTag};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use uuid::Uuid;

pub struct QuestionRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> QuestionRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<question::Model>, DbErr> {
        Question::find_by_id(id).one(self.db).await
    }

    pub async fn tag_ids(&self, id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        let rows = QuestionTag::find()
            .filter(question_tag::Column::QuestionId.eq(id))
            .order_by_asc(question_tag::Column::TagId)
            .all(self.db)
            .await?;
        Ok(rows.into_iter().map(|t| t.tag_id).collect())
    }

    /// Inserts the question row and one row per tag. Run it inside a
    /// transaction so a failed tag insert leaves no untagged question behind.
    pub async fn create(&self, question_data: &crate::domain::Question) -> Result<question::Model, DbErr> {
        let active = question::ActiveModel {
            id: Set(question_data.id),
            author_id: Set(question_data.author_id),
            title: Set(question_data.title.clone()),
            content: Set(question_data.content.clone()),
            category_id: Set(question_data.category_id),
            accepted_answer_id: Set(None),
            view_count: Set(0),
            created_at: Set(Some(chrono::Utc::now())),
        };
        let row = active.insert(self.db).await?;

        if !question_data.tag_ids.is_empty() {
            let tags = question_data.tag_ids.iter().map(|tag_id| question_tag::ActiveModel {
                question_id: Set(row.id),
                tag_id: Set(*tag_id),
            });
            QuestionTag::insert_many(tags).exec(self.db).await?;
        }

        Ok(row)
    }

    /// Locks the question row for the rest of the transaction so two accepts
    /// on one question run one after the other.
    pub async fn find_for_update(&self, id: Uuid) -> Result<Option<question::Model>, DbErr> {
        Question::find_by_id(id).lock_exclusive().one(self.db).await
    }

    pub async fn set_accepted_answer(&self, id: Uuid, answer_id: Option<Uuid>) -> Result<(), DbErr> {
        let result = Question::update_many()
            .col_expr(question::Column::AcceptedAnswerId, Expr::value(answer_id))
            .filter(question::Column::Id.eq(id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("question {}", id)));
        }
        Ok(())
    }

    pub async fn increment_view_count(&self, id: Uuid) -> Result<(), DbErr> {
        let result = Question::update_many()
            .col_expr(
                question::Column::ViewCount,
                Expr::col(question::Column::ViewCount).add(1),
            )
            .filter(question::Column::Id.eq(id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("question {}", id)));
        }
        Ok(())
    }
}
