//! The question set bundled into the binary.

use crate::error::BankError;
use crate::model::{BankSource, QuestionBank};
use crate::parser::parse_bank_str;

const BUILTIN_QUESTIONS: &str = include_str!("../data/builtin_questions.json");

/// Parse the bundled question set.
pub fn builtin_bank() -> Result<QuestionBank, BankError> {
    parse_bank_str(BUILTIN_QUESTIONS, BankSource::Builtin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{has_errors, validate_bank};

    #[test]
    fn builtin_bank_parses() {
        let bank = builtin_bank().unwrap();
        assert_eq!(bank.source, BankSource::Builtin);
        assert_eq!(bank.key.as_deref(), Some("exam_questions"));
        assert_eq!(bank.questions.len(), 199);
        assert_eq!(bank.display_title(), "Marriage and Family Relationships");
    }

    #[test]
    fn builtin_bank_is_valid() {
        let bank = builtin_bank().unwrap();
        let warnings = validate_bank(&bank);
        assert!(!has_errors(&warnings), "{warnings:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn builtin_bank_keeps_topics_in_document_order() {
        let bank = builtin_bank().unwrap();
        let topics = bank.topics();
        let first = topics.iter().next().unwrap();
        assert_eq!(first.topic, "Definition of Marriage");
        assert_eq!(first.count, 1);
    }
}
