use super::QaStore;
use qa_errors::AppError;
use uuid::Uuid;

pub struct RecordView<S> {
    store: S,
}

impl<S: QaStore> RecordView<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn execute(&self, question_id: Uuid) -> Result<i64, AppError> {
        self.store
            .increment_view_count(question_id)
            .await
            .inspect_err(|e| tracing::warn!(%question_id, "Failed to record view: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures::thread_with_answers;

    #[tokio::test]
    async fn test_counts_views_and_reports_missing() {
        let thread = thread_with_answers(0).await;
        let use_case = RecordView::new(thread.store.clone());

        assert_eq!(use_case.execute(thread.question.id).await.unwrap(), 1);
        assert_eq!(use_case.execute(thread.question.id).await.unwrap(), 2);
        assert!(matches!(
            use_case.execute(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
