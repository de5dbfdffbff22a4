pub mod answer;
pub mod question;
pub mod question_tag;
pub mod vote;

pub use answer::Entity as Answer;
pub use question::Entity as Question;
pub use question_tag::Entity as QuestionTag;
pub use vote::Entity as Vote;
