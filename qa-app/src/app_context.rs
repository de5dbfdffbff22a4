use crate::application::{
    AcceptAnswer, CastVote, ListAnswers, PostAnswer, PostQuestion, QaStore, RecordView,
};
use crate::config::AppConfig;
use crate::domain::Question;
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::security::{InFlight, RateLimiter};
use qa_errors::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext<S> {
    pub cast_vote: Arc<CastVote<S>>,
    pub accept_answer: Arc<AcceptAnswer<S>>,
    pub list_answers: Arc<ListAnswers<S>>,
    pub post_answer: Arc<PostAnswer<S>>,
    pub post_question: Arc<PostQuestion<S>>,
    pub record_view: Arc<RecordView<S>>,
    pub rate_limiter: RateLimiter,
}

impl<S: QaStore + Clone> AppContext<S> {
    pub fn new(store: S, config: &AppConfig) -> Self {
        let in_flight = InFlight::new();
        Self {
            cast_vote: Arc::new(CastVote::new(store.clone(), in_flight.clone())),
            accept_answer: Arc::new(AcceptAnswer::new(store.clone(), in_flight)),
            list_answers: Arc::new(ListAnswers::new(store.clone())),
            post_answer: Arc::new(PostAnswer::new(store.clone())),
            post_question: Arc::new(PostQuestion::new(store.clone())),
            record_view: Arc::new(RecordView::new(store)),
            rate_limiter: RateLimiter::new(config.actions_per_minute, config.actions_per_hour),
        }
    }
}

impl AppContext<MemoryStore> {
    /// In-memory context with one sample question, for running without a
    /// database.
    pub fn demo(config: &AppConfig) -> Result<Self, AppError> {
        tracing::warn!("DATABASE_URL not set, running in demo mode with an in-memory store");
        let store = MemoryStore::new();
        let question = store.put_question(Question {
            content: "Post an answer, vote on the ones you find useful, and accept the best one \
                      if you asked the question."
                .to_string(),
            ..Question::new(
                uuid::Uuid::new_v4(),
                "Welcome! How does answer voting work here?".to_string(),
            )
        })?;
        tracing::info!(
            question_id = %question.id,
            author_id = %question.author_id,
            "Seeded demo question"
        );
        Ok(Self::new(store, config))
    }
}

#[cfg(feature = "db")]
impl AppContext<crate::infrastructure::db::SeaOrmStore> {
    pub async fn connect(database_url: &str, config: &AppConfig) -> Result<Self, AppError> {
        use crate::infrastructure::db::{create_connection, run_migrations, SeaOrmStore};

        let db = create_connection(database_url)
            .await
            .map_err(|e| AppError::Internal(format!("database connection failed: {}", e)))?;
        run_migrations(&db)
            .await
            .map_err(|e| AppError::Internal(format!("migrations failed: {}", e)))?;
        tracing::info!("Connected to database");

        Ok(Self::new(SeaOrmStore::new(db), config))
    }
}
