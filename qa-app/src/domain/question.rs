use super::AnswerView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: uuid::Uuid,
    pub author_id: uuid::Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Option<uuid::Uuid>,
    pub tag_ids: Vec<uuid::Uuid>,
    pub accepted_answer_id: Option<uuid::Uuid>,
    pub view_count: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Input for asking a question, as submitted by the author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub title: String,
    pub content: String,
    pub category_id: uuid::Uuid,
    pub tag_ids: Vec<uuid::Uuid>,
}

impl Question {
    pub fn new(author_id: uuid::Uuid, title: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            author_id,
            title,
            content: String::new(),
            category_id: None,
            tag_ids: Vec::new(),
            accepted_answer_id: None,
            view_count: 0,
            created_at: None,
        }
    }

    pub fn ask(author_id: uuid::Uuid, input: NewQuestion) -> Self {
        Self {
            content: input.content,
            category_id: Some(input.category_id),
            tag_ids: input.tag_ids,
            ..Self::new(author_id, input.title)
        }
    }

    pub fn is_author(&self, user_id: uuid::Uuid) -> bool {
        self.author_id == user_id
    }

    pub fn has_accepted_answer(&self) -> bool {
        self.accepted_answer_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub id: uuid::Uuid,
    pub author_id: uuid::Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Option<uuid::Uuid>,
    pub tag_ids: Vec<uuid::Uuid>,
    pub accepted_answer_id: Option<uuid::Uuid>,
    pub has_accepted_answer: bool,
    pub view_count: i64,
}

impl From<Question> for QuestionSummary {
    fn from(q: Question) -> Self {
        Self {
            has_accepted_answer: q.has_accepted_answer(),
            id: q.id,
            author_id: q.author_id,
            title: q.title,
            content: q.content,
            category_id: q.category_id,
            tag_ids: q.tag_ids,
            accepted_answer_id: q.accepted_answer_id,
            view_count: q.view_count,
        }
    }
}

/// A question with its answers in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerThread {
    pub question: QuestionSummary,
    pub answers: Vec<AnswerView>,
}

/// Result of an accept operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptResult {
    pub question_id: uuid::Uuid,
    pub accepted_answer_id: uuid::Uuid,
    pub changed: bool,
}
