//! In-process store used for demo mode and tests.
//!
//! A transaction reads from a private copy of the state and records its
//! writes in a log. Every vote set and every question's acceptance carries a
//! version; commit checks that none of the versions the transaction touched
//! moved since it began, then replays the log on the current state. Writes
//! outside those keys (new answers, view counts) never invalidate an open
//! transaction.

use crate::application::{QaStore, StoreTx};
use crate::domain::{score_of, Answer, Question, Vote, VoteDirection};
use async_trait::async_trait;
use qa_errors::AppError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct State {
    questions: HashMap<Uuid, Question>,
    // Kept in insertion order so listings are stable.
    answers: Vec<Answer>,
    votes: Vec<Vote>,
}

impl State {
    fn answer(&self, id: Uuid) -> Result<&Answer, AppError> {
        self.answers
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("answer {}", id)))
    }

    fn answer_mut(&mut self, id: Uuid) -> Result<&mut Answer, AppError> {
        self.answers
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("answer {}", id)))
    }

    fn vote(&self, id: Uuid) -> Result<&Vote, AppError> {
        self.votes
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| AppError::NotFound(format!("vote {}", id)))
    }

    fn vote_mut(&mut self, id: Uuid) -> Result<&mut Vote, AppError> {
        self.votes
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| AppError::NotFound(format!("vote {}", id)))
    }
}

/// Unit of optimistic validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Guarded {
    /// The vote set of one answer, and so its score.
    Votes(Uuid),
    /// Which answer of one question is accepted.
    Acceptance(Uuid),
}

#[derive(Debug, Clone)]
enum Write {
    CreateVote(Vote),
    UpdateVote { vote_id: Uuid, direction: VoteDirection },
    DeleteVote(Uuid),
    RefreshScore(Uuid),
    SetAccepted { answer_id: Uuid, accepted: bool },
    ClearAccepted { question_id: Uuid, except_answer_id: Uuid },
    SetAcceptedPointer { question_id: Uuid, answer_id: Option<Uuid> },
}

impl Write {
    fn apply(&self, state: &mut State) -> Result<(), AppError> {
        match self {
            Write::CreateVote(vote) => {
                let duplicate = state
                    .votes
                    .iter()
                    .any(|v| v.user_id == vote.user_id && v.answer_id == vote.answer_id);
                if duplicate {
                    return Err(AppError::Conflict(format!(
                        "vote by {} on {} already exists",
                        vote.user_id, vote.answer_id
                    )));
                }
                state.votes.push(vote.clone());
            }
            Write::UpdateVote { vote_id, direction } => {
                state.vote_mut(*vote_id)?.direction = *direction;
            }
            Write::DeleteVote(vote_id) => {
                let before = state.votes.len();
                state.votes.retain(|v| v.id != *vote_id);
                if state.votes.len() == before {
                    return Err(AppError::NotFound(format!("vote {}", vote_id)));
                }
            }
            Write::RefreshScore(answer_id) => {
                let score = score_of(
                    state
                        .votes
                        .iter()
                        .filter(|v| v.answer_id == *answer_id)
                        .map(|v| v.direction),
                );
                state.answer_mut(*answer_id)?.vote_score = score;
            }
            Write::SetAccepted { answer_id, accepted } => {
                state.answer_mut(*answer_id)?.is_accepted = *accepted;
            }
            Write::ClearAccepted {
                question_id,
                except_answer_id,
            } => {
                state
                    .answers
                    .iter_mut()
                    .filter(|a| a.question_id == *question_id && a.id != *except_answer_id)
                    .for_each(|a| a.is_accepted = false);
            }
            Write::SetAcceptedPointer {
                question_id,
                answer_id,
            } => {
                state
                    .questions
                    .get_mut(question_id)
                    .ok_or_else(|| AppError::NotFound(format!("question {}", question_id)))?
                    .accepted_answer_id = *answer_id;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Versioned {
    versions: HashMap<Guarded, u64>,
    state: State,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Versioned>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous insert, used to seed demo mode and tests.
    pub fn put_question(&self, question: Question) -> Result<Question, AppError> {
        let mut inner = lock(&self.inner)?;
        let mut stored = question;
        stored.created_at.get_or_insert_with(chrono::Utc::now);
        inner.state.questions.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

fn lock(inner: &Mutex<Versioned>) -> Result<MutexGuard<'_, Versioned>, AppError> {
    inner
        .lock()
        .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
}

#[async_trait]
impl QaStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, AppError> {
        let inner = lock(&self.inner)?;
        Ok(MemoryTx {
            store: Arc::clone(&self.inner),
            base_versions: inner.versions.clone(),
            state: inner.state.clone(),
            read: HashSet::new(),
            written: HashSet::new(),
            log: Vec::new(),
        })
    }

    async fn find_question(&self, id: Uuid) -> Result<Option<Question>, AppError> {
        Ok(lock(&self.inner)?.state.questions.get(&id).cloned())
    }

    async fn find_answer(&self, id: Uuid) -> Result<Option<Answer>, AppError> {
        Ok(lock(&self.inner)?
            .state
            .answers
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_answers(&self, question_id: Uuid) -> Result<Vec<Answer>, AppError> {
        Ok(lock(&self.inner)?
            .state
            .answers
            .iter()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn votes_by_user(&self, user_id: Uuid, answer_ids: &[Uuid]) -> Result<Vec<Vote>, AppError> {
        Ok(lock(&self.inner)?
            .state
            .votes
            .iter()
            .filter(|v| v.user_id == user_id && answer_ids.contains(&v.answer_id))
            .cloned()
            .collect())
    }

    async fn answer_vote_score(&self, answer_id: Uuid) -> Result<i32, AppError> {
        Ok(lock(&self.inner)?.state.answer(answer_id)?.vote_score)
    }

    async fn insert_question(&self, question: &Question) -> Result<Question, AppError> {
        self.put_question(question.clone())
    }

    async fn insert_answer(&self, answer: &Answer) -> Result<Answer, AppError> {
        let mut inner = lock(&self.inner)?;
        if !inner.state.questions.contains_key(&answer.question_id) {
            return Err(AppError::NotFound(format!("question {}", answer.question_id)));
        }
        let mut stored = answer.clone();
        stored.created_at.get_or_insert_with(chrono::Utc::now);
        inner.state.answers.push(stored.clone());
        Ok(stored)
    }

    async fn increment_view_count(&self, question_id: Uuid) -> Result<i64, AppError> {
        let mut inner = lock(&self.inner)?;
        let question = inner
            .state
            .questions
            .get_mut(&question_id)
            .ok_or_else(|| AppError::NotFound(format!("question {}", question_id)))?;
        question.view_count += 1;
        Ok(question.view_count)
    }
}

pub struct MemoryTx {
    store: Arc<Mutex<Versioned>>,
    base_versions: HashMap<Guarded, u64>,
    state: State,
    read: HashSet<Guarded>,
    written: HashSet<Guarded>,
    log: Vec<Write>,
}

impl MemoryTx {
    fn record(&mut self, key: Guarded, write: Write) -> Result<(), AppError> {
        write.apply(&mut self.state)?;
        self.written.insert(key);
        self.log.push(write);
        Ok(())
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_question(&mut self, id: Uuid) -> Result<Option<Question>, AppError> {
        self.read.insert(Guarded::Acceptance(id));
        Ok(self.state.questions.get(&id).cloned())
    }

    async fn find_answer(&mut self, id: Uuid) -> Result<Option<Answer>, AppError> {
        Ok(self.state.answers.iter().find(|a| a.id == id).cloned())
    }

    async fn find_vote(&mut self, user_id: Uuid, answer_id: Uuid) -> Result<Option<Vote>, AppError> {
        self.read.insert(Guarded::Votes(answer_id));
        Ok(self
            .state
            .votes
            .iter()
            .find(|v| v.user_id == user_id && v.answer_id == answer_id)
            .cloned())
    }

    async fn create_vote(
        &mut self,
        user_id: Uuid,
        answer_id: Uuid,
        direction: VoteDirection,
    ) -> Result<Vote, AppError> {
        let mut vote = Vote::new(user_id, answer_id, direction);
        vote.created_at = Some(chrono::Utc::now());
        self.record(Guarded::Votes(answer_id), Write::CreateVote(vote.clone()))?;
        Ok(vote)
    }

    async fn update_vote(&mut self, vote_id: Uuid, direction: VoteDirection) -> Result<(), AppError> {
        let answer_id = self.state.vote(vote_id)?.answer_id;
        self.record(
            Guarded::Votes(answer_id),
            Write::UpdateVote { vote_id, direction },
        )
    }

    async fn delete_vote(&mut self, vote_id: Uuid) -> Result<(), AppError> {
        let answer_id = self.state.vote(vote_id)?.answer_id;
        self.record(Guarded::Votes(answer_id), Write::DeleteVote(vote_id))
    }

    async fn refresh_vote_score(&mut self, answer_id: Uuid) -> Result<i32, AppError> {
        self.record(Guarded::Votes(answer_id), Write::RefreshScore(answer_id))?;
        Ok(self.state.answer(answer_id)?.vote_score)
    }

    async fn set_answer_accepted(&mut self, answer_id: Uuid, accepted: bool) -> Result<(), AppError> {
        let question_id = self.state.answer(answer_id)?.question_id;
        self.record(
            Guarded::Acceptance(question_id),
            Write::SetAccepted { answer_id, accepted },
        )
    }

    async fn clear_accepted_for_question(
        &mut self,
        question_id: Uuid,
        except_answer_id: Uuid,
    ) -> Result<(), AppError> {
        self.record(
            Guarded::Acceptance(question_id),
            Write::ClearAccepted {
                question_id,
                except_answer_id,
            },
        )
    }

    async fn set_question_accepted_answer(
        &mut self,
        question_id: Uuid,
        answer_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        self.record(
            Guarded::Acceptance(question_id),
            Write::SetAcceptedPointer {
                question_id,
                answer_id,
            },
        )
    }

    async fn commit(self) -> Result<(), AppError> {
        if self.log.is_empty() {
            return Ok(());
        }

        let mut inner = lock(&self.store)?;
        let moved = self
            .read
            .union(&self.written)
            .find(|key| inner.versions.get(*key) != self.base_versions.get(*key));
        if let Some(key) = moved {
            tracing::debug!(?key, "Memory transaction lost a race");
            return Err(AppError::Conflict(
                "store changed since the transaction began".to_string(),
            ));
        }

        let mut next = inner.state.clone();
        for write in &self.log {
            write.apply(&mut next)?;
        }
        inner.state = next;
        for key in self.written {
            *inner.versions.entry(key).or_insert(0) += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (MemoryStore, Question, Answer) {
        let store = MemoryStore::new();
        let question = store
            .put_question(Question::new(Uuid::new_v4(), "How do transactions work?".into()))
            .unwrap();
        let answer = Answer::new(question.id, Uuid::new_v4(), "They are atomic units.".into());
        (store, question, answer)
    }

    #[tokio::test]
    async fn test_dropped_tx_discards_writes() {
        let (store, _, answer) = seeded();
        let answer = store.insert_answer(&answer).await.unwrap();
        let voter = Uuid::new_v4();

        {
            let mut tx = store.begin().await.unwrap();
            tx.create_vote(voter, answer.id, VoteDirection::Up).await.unwrap();
            tx.refresh_vote_score(answer.id).await.unwrap();
        }

        assert!(store.votes_by_user(voter, &[answer.id]).await.unwrap().is_empty());
        assert_eq!(store.answer_vote_score(answer.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stale_commit_conflicts() {
        let (store, _, answer) = seeded();
        let answer = store.insert_answer(&answer).await.unwrap();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        first.create_vote(Uuid::new_v4(), answer.id, VoteDirection::Up).await.unwrap();
        first.refresh_vote_score(answer.id).await.unwrap();
        second.create_vote(Uuid::new_v4(), answer.id, VoteDirection::Down).await.unwrap();
        second.refresh_vote_score(answer.id).await.unwrap();

        first.commit().await.unwrap();
        assert!(matches!(second.commit().await, Err(AppError::Conflict(_))));
        assert_eq!(store.answer_vote_score(answer.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_writes_do_not_invalidate_open_tx() {
        let (store, question, answer) = seeded();
        let answer = store.insert_answer(&answer).await.unwrap();
        let other = store
            .put_question(Question::new(Uuid::new_v4(), "Unrelated question".into()))
            .unwrap();
        let voter = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        tx.find_vote(voter, answer.id).await.unwrap();
        tx.create_vote(voter, answer.id, VoteDirection::Up).await.unwrap();
        tx.refresh_vote_score(answer.id).await.unwrap();

        store.increment_view_count(other.id).await.unwrap();
        store.increment_view_count(question.id).await.unwrap();
        let late = store
            .insert_answer(&Answer::new(question.id, Uuid::new_v4(), "Posted mid-vote".into()))
            .await
            .unwrap();

        tx.commit().await.unwrap();

        assert_eq!(store.answer_vote_score(answer.id).await.unwrap(), 1);
        let question = store.find_question(question.id).await.unwrap().unwrap();
        assert_eq!(question.view_count, 1);
        assert!(store.find_answer(late.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_vote_and_accept_on_same_answer_both_land() {
        let (store, question, answer) = seeded();
        let answer = store.insert_answer(&answer).await.unwrap();

        let mut vote = store.begin().await.unwrap();
        vote.create_vote(Uuid::new_v4(), answer.id, VoteDirection::Up).await.unwrap();
        vote.refresh_vote_score(answer.id).await.unwrap();

        let mut accept = store.begin().await.unwrap();
        accept.find_question(question.id).await.unwrap();
        accept.clear_accepted_for_question(question.id, answer.id).await.unwrap();
        accept.set_answer_accepted(answer.id, true).await.unwrap();
        accept
            .set_question_accepted_answer(question.id, Some(answer.id))
            .await
            .unwrap();

        accept.commit().await.unwrap();
        vote.commit().await.unwrap();

        let stored = store.find_answer(answer.id).await.unwrap().unwrap();
        assert!(stored.is_accepted);
        assert_eq!(stored.vote_score, 1);
    }

    #[tokio::test]
    async fn test_duplicate_vote_rejected() {
        let (store, _, answer) = seeded();
        let answer = store.insert_answer(&answer).await.unwrap();
        let voter = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        tx.create_vote(voter, answer.id, VoteDirection::Up).await.unwrap();
        assert!(matches!(
            tx.create_vote(voter, answer.id, VoteDirection::Down).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_view_count_increments() {
        let (store, question, _) = seeded();
        assert_eq!(store.increment_view_count(question.id).await.unwrap(), 1);
        assert_eq!(store.increment_view_count(question.id).await.unwrap(), 2);
        assert!(matches!(
            store.increment_view_count(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
