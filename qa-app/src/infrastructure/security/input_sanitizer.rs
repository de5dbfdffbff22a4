use crate::domain::NewQuestion;
use qa_errors::AppError;
use std::sync::OnceLock;
use uuid::Uuid;

const MAX_CONTENT_LENGTH: usize = 10_000;
const MIN_ANSWER_LENGTH: usize = 10;
const MIN_TITLE_LENGTH: usize = 5;
const MAX_TITLE_LENGTH: usize = 100;
const MIN_QUESTION_LENGTH: usize = 10;
const MAX_TAGS: usize = 5;

fn angle_brackets() -> &'static regex_lite::Regex {
    static RE: OnceLock<regex_lite::Regex> = OnceLock::new();
    RE.get_or_init(|| regex_lite::Regex::new("[<>]").expect("static pattern"))
}

pub struct InputSanitizer;

impl InputSanitizer {
    /// Strips angle brackets and control characters, trims and caps the
    /// length.
    pub fn sanitize_content(content: &str) -> String {
        let stripped = angle_brackets().replace_all(content, "");
        let printable: String = stripped
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();
        printable.trim().chars().take(MAX_CONTENT_LENGTH).collect()
    }

    pub fn validate_answer(content: &str) -> Result<String, AppError> {
        let sanitized = Self::sanitize_content(content);

        if sanitized.chars().count() < MIN_ANSWER_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "Answer must be at least {} characters",
                MIN_ANSWER_LENGTH
            )));
        }

        Ok(sanitized)
    }

    /// Sanitizes title and content, and requires one to five distinct tags.
    pub fn validate_question(input: NewQuestion) -> Result<NewQuestion, AppError> {
        let title = Self::sanitize_content(&input.title);
        let title_length = title.chars().count();
        if title_length < MIN_TITLE_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "Title must be at least {} characters",
                MIN_TITLE_LENGTH
            )));
        }
        if title_length > MAX_TITLE_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "Title must not exceed {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        let content = Self::sanitize_content(&input.content);
        if content.chars().count() < MIN_QUESTION_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "Content must be at least {} characters",
                MIN_QUESTION_LENGTH
            )));
        }

        let mut tag_ids: Vec<Uuid> = Vec::with_capacity(input.tag_ids.len());
        for tag_id in input.tag_ids {
            if !tag_ids.contains(&tag_id) {
                tag_ids.push(tag_id);
            }
        }
        if tag_ids.is_empty() {
            return Err(AppError::InvalidInput("At least one tag is required".to_string()));
        }
        if tag_ids.len() > MAX_TAGS {
            return Err(AppError::InvalidInput(format!(
                "Maximum {} tags allowed",
                MAX_TAGS
            )));
        }

        Ok(NewQuestion {
            title,
            content,
            category_id: input.category_id,
            tag_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup_and_trims() {
        assert_eq!(
            InputSanitizer::sanitize_content("  <b>bold</b> move  "),
            "bbold/b move"
        );
    }

    #[test]
    fn test_control_characters_removed_before_trim() {
        assert_eq!(InputSanitizer::sanitize_content("text \u{7}"), "text");
        assert_eq!(InputSanitizer::sanitize_content("\u{0}  line\tone\n"), "line\tone");
    }

    #[test]
    fn test_length_cap() {
        let long = "a".repeat(MAX_CONTENT_LENGTH + 50);
        assert_eq!(
            InputSanitizer::sanitize_content(&long).len(),
            MAX_CONTENT_LENGTH
        );
    }

    #[test]
    fn test_answer_too_short() {
        assert!(InputSanitizer::validate_answer("short").is_err());
        assert!(InputSanitizer::validate_answer("<<<<<<<<<<<<abc>>>>").is_err());
        assert!(InputSanitizer::validate_answer("Use a transaction here.").is_ok());
    }

    fn question(title: &str, tags: usize) -> NewQuestion {
        NewQuestion {
            title: title.to_string(),
            content: "How do I share state between handlers?".to_string(),
            category_id: Uuid::new_v4(),
            tag_ids: (0..tags).map(|_| Uuid::new_v4()).collect(),
        }
    }

    #[test]
    fn test_question_rules() {
        let ok = InputSanitizer::validate_question(question("  <Arc> or Rc?  ", 2)).unwrap();
        assert_eq!(ok.title, "Arc or Rc?");
        assert_eq!(ok.tag_ids.len(), 2);

        assert!(InputSanitizer::validate_question(question("Why", 1)).is_err());
        assert!(InputSanitizer::validate_question(question(&"t".repeat(101), 1)).is_err());
        assert!(InputSanitizer::validate_question(question(&"t".repeat(100), 5)).is_ok());
        assert!(InputSanitizer::validate_question(question("Valid title", 0)).is_err());
        assert!(InputSanitizer::validate_question(question("Valid title", 6)).is_err());

        let mut short = question("Valid title", 1);
        short.content = "Too short".to_string();
        assert!(matches!(
            InputSanitizer::validate_question(short),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_repeated_tags_collapse() {
        let tag = Uuid::new_v4();
        let mut input = question("Valid title", 0);
        input.tag_ids = vec![tag, tag, tag];
        let ok = InputSanitizer::validate_question(input).unwrap();
        assert_eq!(ok.tag_ids, vec![tag]);
    }
}
