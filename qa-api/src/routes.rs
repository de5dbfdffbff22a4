use axum::{
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use qa_app::application::QaStore;
use qa_app::domain::{
    AcceptResult, Answer, AnswerThread, NewQuestion, Question, VoteDirection, VoteResult,
};
use qa_app::AppContext;
use qa_errors::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Set by the auth layer in front of this service once it has verified the
/// session.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the caller, if any.
pub struct Caller(pub Option<Uuid>);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Caller(None));
        };
        raw.to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(|id| Caller(Some(id)))
            .ok_or_else(|| AppError::InvalidInput(format!("{} is not a valid user id", USER_ID_HEADER)))
    }
}

#[derive(Deserialize)]
struct VoteBody {
    direction: VoteDirection,
}

#[derive(Deserialize)]
struct AcceptBody {
    answer_id: Uuid,
}

#[derive(Deserialize)]
struct AnswerBody {
    content: String,
}

#[derive(Serialize)]
struct ViewCount {
    view_count: i64,
}

pub fn router<S>(ctx: AppContext<S>) -> Router
where
    S: QaStore + Clone + 'static,
{
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/questions", post(post_question::<S>))
        .route("/api/answers/{answer_id}/vote", post(cast_vote::<S>))
        .route("/api/questions/{question_id}/accept", post(accept_answer::<S>))
        .route(
            "/api/questions/{question_id}/answers",
            get(list_answers::<S>).post(post_answer::<S>),
        )
        .route("/api/questions/{question_id}/views", post(record_view::<S>))
        .with_state(ctx)
}

fn check_rate_limit<S>(ctx: &AppContext<S>, caller: Option<Uuid>) -> Result<(), AppError> {
    match caller {
        Some(user_id) => ctx.rate_limiter.check(user_id),
        None => Ok(()),
    }
}

async fn cast_vote<S: QaStore + Clone + 'static>(
    State(ctx): State<AppContext<S>>,
    Caller(caller): Caller,
    Path(answer_id): Path<Uuid>,
    Json(body): Json<VoteBody>,
) -> Result<Json<VoteResult>, AppError> {
    check_rate_limit(&ctx, caller)?;
    let result = ctx.cast_vote.execute(caller, answer_id, body.direction).await?;
    Ok(Json(result))
}

async fn accept_answer<S: QaStore + Clone + 'static>(
    State(ctx): State<AppContext<S>>,
    Caller(caller): Caller,
    Path(question_id): Path<Uuid>,
    Json(body): Json<AcceptBody>,
) -> Result<Json<AcceptResult>, AppError> {
    check_rate_limit(&ctx, caller)?;
    let result = ctx
        .accept_answer
        .execute(caller, question_id, body.answer_id)
        .await?;
    Ok(Json(result))
}

async fn list_answers<S: QaStore + Clone + 'static>(
    State(ctx): State<AppContext<S>>,
    Caller(caller): Caller,
    Path(question_id): Path<Uuid>,
) -> Result<Json<AnswerThread>, AppError> {
    let thread = ctx.list_answers.execute(caller, question_id).await?;
    Ok(Json(thread))
}

async fn post_question<S: QaStore + Clone + 'static>(
    State(ctx): State<AppContext<S>>,
    Caller(caller): Caller,
    Json(body): Json<NewQuestion>,
) -> Result<Json<Question>, AppError> {
    check_rate_limit(&ctx, caller)?;
    let question = ctx.post_question.execute(caller, body).await?;
    Ok(Json(question))
}

async fn post_answer<S: QaStore + Clone + 'static>(
    State(ctx): State<AppContext<S>>,
    Caller(caller): Caller,
    Path(question_id): Path<Uuid>,
    Json(body): Json<AnswerBody>,
) -> Result<Json<Answer>, AppError> {
    check_rate_limit(&ctx, caller)?;
    let answer = ctx
        .post_answer
        .execute(caller, question_id, &body.content)
        .await?;
    Ok(Json(answer))
}

async fn record_view<S: QaStore + Clone + 'static>(
    State(ctx): State<AppContext<S>>,
    Path(question_id): Path<Uuid>,
) -> Result<Json<ViewCount>, AppError> {
    let view_count = ctx.record_view.execute(question_id).await?;
    Ok(Json(ViewCount { view_count }))
}
