mod accept_answer;
mod cast_vote;
mod list_answers;
mod post_answer;
mod post_question;
mod record_view;
mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use accept_answer::AcceptAnswer;
pub use cast_vote::CastVote;
pub use list_answers::ListAnswers;
pub use post_answer::PostAnswer;
pub use post_question::PostQuestion;
pub use record_view::RecordView;
pub use store::{QaStore, StoreTx};
