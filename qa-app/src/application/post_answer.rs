use super::QaStore;
use crate::domain::Answer;
use crate::infrastructure::security::InputSanitizer;
use qa_errors::AppError;
use uuid::Uuid;

pub struct PostAnswer<S> {
    store: S,
}

impl<S: QaStore> PostAnswer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        author_id: Option<Uuid>,
        question_id: Uuid,
        content: &str,
    ) -> Result<Answer, AppError> {
        let author_id = author_id.ok_or(AppError::Unauthenticated)?;
        let content = InputSanitizer::validate_answer(content)?;

        if self.store.find_question(question_id).await?.is_none() {
            return Err(AppError::NotFound(format!("question {}", question_id)));
        }

        let answer = self
            .store
            .insert_answer(&Answer::new(question_id, author_id, content))
            .await?;

        tracing::info!(%question_id, answer_id = %answer.id, %author_id, "Answer posted");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures::thread_with_answers;

    #[tokio::test]
    async fn test_posts_sanitized_answer() {
        let thread = thread_with_answers(0).await;
        let author = Uuid::new_v4();

        let answer = PostAnswer::new(thread.store.clone())
            .execute(Some(author), thread.question.id, "  Wrap it in an <Arc> instead.  ")
            .await
            .unwrap();

        assert_eq!(answer.content, "Wrap it in an Arc instead.");
        assert_eq!(answer.vote_score, 0);
        assert!(!answer.is_accepted);
        assert_eq!(thread.store.list_answers(thread.question.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejections() {
        let thread = thread_with_answers(0).await;
        let use_case = PostAnswer::new(thread.store.clone());

        assert_eq!(
            use_case
                .execute(None, thread.question.id, "A perfectly long answer")
                .await,
            Err(AppError::Unauthenticated)
        );
        assert!(matches!(
            use_case.execute(Some(Uuid::new_v4()), thread.question.id, "short").await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            use_case
                .execute(Some(Uuid::new_v4()), Uuid::new_v4(), "A perfectly long answer")
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
