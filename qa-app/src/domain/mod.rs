mod answer;
mod question;
mod vote;

pub use answer::{sort_for_display, Answer, AnswerView};
pub use question::{AcceptResult, AnswerThread, NewQuestion, Question, QuestionSummary};
pub use vote::{score_of, Vote, VoteAction, VoteDirection, VoteResult};
