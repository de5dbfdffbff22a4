use super::VoteDirection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: uuid::Uuid,
    pub question_id: uuid::Uuid,
    pub author_id: uuid::Uuid,
    pub content: String,
    pub vote_score: i32,
    pub is_accepted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Answer {
    pub fn new(question_id: uuid::Uuid, author_id: uuid::Uuid, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            question_id,
            author_id,
            content,
            vote_score: 0,
            is_accepted: false,
            created_at: None,
        }
    }
}

/// Answer as shown to a particular viewer, with their own vote attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerView {
    #[serde(flatten)]
    pub answer: Answer,
    pub user_vote: Option<VoteDirection>,
}

/// Accepted answer first, then highest score. Stable, so ties keep the
/// order the store returned them in.
pub fn sort_for_display(answers: &mut [Answer]) {
    answers.sort_by(|a, b| {
        b.is_accepted
            .cmp(&a.is_accepted)
            .then_with(|| b.vote_score.cmp(&a.vote_score))
    });
}
