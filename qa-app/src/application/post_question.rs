use super::QaStore;
use crate::domain::{NewQuestion, Question};
use crate::infrastructure::security::InputSanitizer;
use qa_errors::AppError;
use uuid::Uuid;

pub struct PostQuestion<S> {
    store: S,
}

impl<S: QaStore> PostQuestion<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        author_id: Option<Uuid>,
        input: NewQuestion,
    ) -> Result<Question, AppError> {
        let author_id = author_id.ok_or(AppError::Unauthenticated)?;
        let input = InputSanitizer::validate_question(input)?;

        let question = self
            .store
            .insert_question(&Question::ask(author_id, input))
            .await?;

        tracing::info!(
            question_id = %question.id,
            %author_id,
            tags = question.tag_ids.len(),
            "Question posted"
        );
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryStore;

    fn input(title: &str) -> NewQuestion {
        NewQuestion {
            title: title.to_string(),
            content: "The compiler says the value is dropped while borrowed.".to_string(),
            category_id: Uuid::new_v4(),
            tag_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
        }
    }

    #[tokio::test]
    async fn test_posted_question_is_answerable() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let submitted = input("  Why is my <borrow> too short?  ");

        let question = PostQuestion::new(store.clone())
            .execute(Some(author), submitted.clone())
            .await
            .unwrap();

        assert_eq!(question.title, "Why is my borrow too short?");
        assert_eq!(question.author_id, author);
        assert_eq!(question.category_id, Some(submitted.category_id));
        assert_eq!(question.tag_ids, submitted.tag_ids);
        assert_eq!(question.accepted_answer_id, None);
        assert_eq!(question.view_count, 0);

        let stored = store.find_question(question.id).await.unwrap().unwrap();
        assert_eq!(stored, question);
    }

    #[tokio::test]
    async fn test_rejections() {
        let store = MemoryStore::new();
        let use_case = PostQuestion::new(store.clone());

        assert_eq!(
            use_case.execute(None, input("A valid title")).await,
            Err(AppError::Unauthenticated)
        );
        assert!(matches!(
            use_case.execute(Some(Uuid::new_v4()), input("Why")).await,
            Err(AppError::InvalidInput(_))
        ));

        let mut untagged = input("A valid title");
        untagged.tag_ids.clear();
        assert!(matches!(
            use_case.execute(Some(Uuid::new_v4()), untagged).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
