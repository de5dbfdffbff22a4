use super::QaStore;
use crate::domain::{sort_for_display, AnswerThread, AnswerView, VoteDirection};
use qa_errors::AppError;
use std::collections::HashMap;
use uuid::Uuid;

pub struct ListAnswers<S> {
    store: S,
}

impl<S: QaStore> ListAnswers<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn execute(&self, viewer_id: Option<Uuid>, question_id: Uuid) -> Result<AnswerThread, AppError> {
        let question = self
            .store
            .find_question(question_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("question {}", question_id)))?;

        let mut answers = self.store.list_answers(question_id).await?;
        sort_for_display(&mut answers);

        // Viewer's own votes, keyed by answer
        let own_votes: HashMap<Uuid, VoteDirection> = match viewer_id {
            Some(viewer_id) if !answers.is_empty() => {
                let ids: Vec<Uuid> = answers.iter().map(|a| a.id).collect();
                self.store
                    .votes_by_user(viewer_id, &ids)
                    .await?
                    .into_iter()
                    .map(|v| (v.answer_id, v.direction))
                    .collect()
            }
            _ => HashMap::new(),
        };

        let answers = answers
            .into_iter()
            .map(|answer| AnswerView {
                user_vote: own_votes.get(&answer.id).copied(),
                answer,
            })
            .collect();

        Ok(AnswerThread {
            question: question.into(),
            answers,
        })
    }
}
