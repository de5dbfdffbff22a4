use crate::application::QaStore;
use crate::domain::{Answer, Question};
use crate::infrastructure::memory::MemoryStore;
use uuid::Uuid;

pub(crate) struct Thread {
    pub store: MemoryStore,
    pub author: Uuid,
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// A question by `author` with `count` fresh answers from other users.
pub(crate) async fn thread_with_answers(count: usize) -> Thread {
    let store = MemoryStore::new();
    let author = Uuid::new_v4();
    let question = store
        .put_question(Question::new(author, "Why does my borrow outlive the value?".into()))
        .unwrap();

    let mut answers = Vec::with_capacity(count);
    for i in 0..count {
        let answer = Answer::new(
            question.id,
            Uuid::new_v4(),
            format!("Answer number {} with enough text", i),
        );
        answers.push(store.insert_answer(&answer).await.unwrap());
    }

    Thread {
        store,
        author,
        question,
        answers,
    }
}
