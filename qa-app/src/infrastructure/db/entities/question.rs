use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub category_id: Option<Uuid>,
    pub accepted_answer_id: Option<Uuid>,
    pub view_count: i64,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::answer::Entity")]
    Answers,
    #[sea_orm(has_many = "super::question_tag::Entity")]
    Tags,
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl Related<super::question_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Tags live in their own table and are loaded separately.
    pub fn into_domain(self, tag_ids: Vec<Uuid>) -> crate::domain::Question {
        crate::domain::Question {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
            category_id: self.category_id,
            tag_ids,
            accepted_answer_id: self.accepted_answer_id,
            view_count: self.view_count,
            created_at: self.created_at,
        }
    }
}
