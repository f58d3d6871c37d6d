//! JSON question bank parser.
//!
//! Question banks come in many shapes: a bare array, or an object holding the
//! list under one of several conventional keys, or under an arbitrary key.
//! This module finds the list, converts it into [`Question`]s, and validates
//! the result.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::builtin;
use crate::config::ExamConfig;
use crate::error::BankError;
use crate::model::{AnswerOption, BankSource, Question, QuestionBank, QuestionId, DEFAULT_TOPIC};
use crate::traits::Command;

/// Keys tried first, in order, when the document is an object.
pub const PREFERRED_KEYS: [&str; 5] = [
    "programming_languages_exam_questions",
    "chemistry_questions",
    "questions",
    "quiz_questions",
    "exam_questions",
];

const REQUIRED_FIELDS: [&str; 3] = ["question", "options", "correct_answer"];

/// Intermediate structure for a question as it appears in JSON.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    topic: Option<Value>,
    question: String,
    options: RawOptions,
    correct_answer: Value,
    #[serde(default)]
    page: Option<Value>,
    #[serde(default)]
    explanation: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOptions {
    /// `{"A": "...", "B": "..."}`, in document order.
    Labelled(Map<String, Value>),
    /// `["...", "..."]`, labelled A, B, C... in order.
    Listed(Vec<Value>),
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Text of an optional field; null and blank values count as absent.
fn optional_text(value: Option<Value>) -> Option<String> {
    value
        .filter(|v| !v.is_null())
        .map(value_text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn list_label(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        (index + 1).to_string()
    }
}

impl RawOptions {
    fn into_options(self) -> Vec<AnswerOption> {
        match self {
            RawOptions::Labelled(map) => map
                .into_iter()
                .map(|(label, text)| AnswerOption {
                    label: label.trim().to_string(),
                    text: value_text(text),
                })
                .collect(),
            RawOptions::Listed(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, text)| AnswerOption {
                    label: list_label(i),
                    text: value_text(text),
                })
                .collect(),
        }
    }
}

impl RawQuestion {
    fn into_question(self) -> Question {
        let options = self.options.into_options();

        // Answers like "d" resolve to the canonical label "D".
        let answer = value_text(self.correct_answer).trim().to_string();
        let correct_answer = options
            .iter()
            .find(|o| o.label.eq_ignore_ascii_case(&answer))
            .map(|o| o.label.clone())
            .unwrap_or(answer);

        let id = self.id.and_then(|v| match v {
            Value::Null => None,
            Value::Number(n) => Some(match n.as_u64() {
                Some(n) => QuestionId::Number(n),
                None => QuestionId::Text(n.to_string()),
            }),
            Value::String(s) => Some(QuestionId::Text(s)),
            other => Some(QuestionId::Text(other.to_string())),
        });

        let page = self.page.and_then(|v| match v {
            Value::Number(n) => n.as_u64().and_then(|p| u32::try_from(p).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        let topic = optional_text(self.topic).unwrap_or_else(|| DEFAULT_TOPIC.to_string());

        Question {
            id,
            topic,
            question: self.question,
            options,
            correct_answer,
            page,
            explanation: optional_text(self.explanation),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Whether a JSON value looks like a question (has the three required fields).
fn has_question_shape(item: &Value) -> bool {
    item.as_object()
        .is_some_and(|obj| REQUIRED_FIELDS.iter().all(|f| obj.contains_key(*f)))
}

/// Find the key holding the question list in an object document.
fn locate_question_key(doc: &Map<String, Value>) -> Option<String> {
    for key in PREFERRED_KEYS {
        if let Some(Value::Array(items)) = doc.get(key) {
            if !items.is_empty() && items.iter().all(has_question_shape) {
                return Some(key.to_string());
            }
        }
    }

    // Any other list, judged by its first element.
    doc.iter()
        .find(|(_, value)| match value {
            Value::Array(items) => items.first().is_some_and(has_question_shape),
            _ => false,
        })
        .map(|(key, _)| key.clone())
}

/// Parse a JSON string into a `QuestionBank`.
pub fn parse_bank_str(content: &str, source: BankSource) -> Result<QuestionBank, BankError> {
    let doc: Value = serde_json::from_str(content)?;
    parse_bank_value(doc, source)
}

/// Extract a `QuestionBank` from an already-parsed JSON document.
pub fn parse_bank_value(doc: Value, source: BankSource) -> Result<QuestionBank, BankError> {
    let (title, key, items) = match doc {
        Value::Array(items) => {
            if !items.first().is_some_and(has_question_shape) {
                return Err(BankError::NoQuestions);
            }
            (None, None, items)
        }
        Value::Object(mut map) => {
            let key = locate_question_key(&map).ok_or(BankError::NoQuestions)?;
            let title = map
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string);
            let items = match map.remove(&key) {
                Some(Value::Array(items)) => items,
                _ => return Err(BankError::NoQuestions),
            };
            (title, Some(key), items)
        }
        other => return Err(BankError::NotAnObject(json_type_name(&other))),
    };

    let total = items.len();
    let questions: Vec<Question> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<RawQuestion>(item) {
            Ok(raw) => Some(raw.into_question()),
            Err(e) => {
                tracing::warn!("skipping malformed question #{}: {}", index + 1, e);
                None
            }
        })
        .collect();

    if questions.is_empty() {
        return Err(BankError::NoQuestions);
    }

    match &key {
        Some(key) => tracing::info!(
            "found {} of {} questions under key '{}' in {}",
            questions.len(),
            total,
            key,
            source
        ),
        None => tracing::info!("found {} of {} questions in {}", questions.len(), total, source),
    }

    Ok(QuestionBank {
        title,
        source,
        key,
        questions,
    })
}

/// Read and parse a question bank file.
pub fn parse_bank(path: &Path) -> Result<QuestionBank, BankError> {
    let content = std::fs::read_to_string(path).map_err(|source| BankError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bank_str(&content, BankSource::File(path.to_path_buf()))
}

/// Load the bank used when no source is given: the local bank file if it
/// exists and parses, otherwise the built-in set.
pub fn load_default_bank(config: &ExamConfig) -> Result<QuestionBank, BankError> {
    let local = &config.bank_path;
    if local.exists() {
        match parse_bank(local) {
            Ok(bank) => return Ok(bank),
            Err(e) => {
                tracing::error!("error loading {}: {}; using built-in questions", local.display(), e);
            }
        }
    } else {
        tracing::debug!("{} not found; using built-in questions", local.display());
    }
    builtin::builtin_bank()
}

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The question cannot be answered correctly as written.
    Error,
    /// Worth fixing, but the exam still works.
    Warning,
}

/// A finding from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id or position (if applicable).
    pub question: Option<String>,
    pub severity: Severity,
    /// Warning message.
    pub message: String,
}

fn question_ref(index: usize, q: &Question) -> String {
    match &q.id {
        Some(id) => format!("id {id}"),
        None => format!("#{}", index + 1),
    }
}

/// Validate a question bank for common issues.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut push = |index: usize, q: &Question, severity: Severity, message: String| {
        warnings.push(ValidationWarning {
            question: Some(question_ref(index, q)),
            severity,
            message,
        });
    };

    let mut seen_ids = HashSet::new();
    for (i, q) in bank.questions.iter().enumerate() {
        if let Some(id) = &q.id {
            if !seen_ids.insert(id) {
                push(i, q, Severity::Warning, format!("duplicate question id: {id}"));
            }
        }

        if q.question.trim().is_empty() {
            push(i, q, Severity::Error, "question text is empty".into());
        }

        if q.options.len() < 2 {
            push(
                i,
                q,
                Severity::Error,
                format!("needs at least two options, found {}", q.options.len()),
            );
        }

        let mut seen_labels = HashSet::new();
        for opt in &q.options {
            if !seen_labels.insert(opt.label.to_ascii_uppercase()) {
                push(i, q, Severity::Error, format!("duplicate option label: {}", opt.label));
            }
        }

        if q.correct_option().is_none() {
            push(
                i,
                q,
                Severity::Error,
                format!(
                    "correct answer '{}' is not one of the options ({})",
                    q.correct_answer,
                    q.available_labels()
                ),
            );
        }

        for opt in &q.options {
            if !matches!(opt.label.parse::<Command>(), Ok(Command::Answer(_))) {
                push(
                    i,
                    q,
                    Severity::Warning,
                    format!(
                        "option label '{}' is also a command; answer it with `answer {}`",
                        opt.label, opt.label
                    ),
                );
            }
        }

        if !q.has_explanation() {
            push(i, q, Severity::Warning, "no explanation provided".into());
        }
    }

    warnings
}

/// Whether any finding makes the bank unusable.
pub fn has_errors(warnings: &[ValidationWarning]) -> bool {
    warnings.iter().any(|w| w.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_BANK: &str = r#"
{
  "programming_languages_exam_questions": [
    {
      "id": 1,
      "topic": "Ownership",
      "question": "What happens to a String when it is moved?",
      "options": {
        "D": "It is copied bit for bit and both stay valid.",
        "A": "The original binding can no longer be used.",
        "C": "It is cloned implicitly.",
        "B": "It is dropped immediately."
      },
      "correct_answer": "A",
      "page": 3,
      "explanation": "A move transfers ownership; the source binding is invalidated."
    },
    {
      "id": 2,
      "question": "Which keyword declares a trait?",
      "options": { "A": "impl", "B": "trait", "C": "struct", "D": "enum" },
      "correct_answer": "b"
    }
  ]
}
"#;

    fn parse(content: &str) -> Result<QuestionBank, BankError> {
        parse_bank_str(content, BankSource::Stdin)
    }

    #[test]
    fn parse_preferred_key() {
        let bank = parse(VALID_BANK).unwrap();
        assert_eq!(bank.key.as_deref(), Some("programming_languages_exam_questions"));
        assert_eq!(bank.questions.len(), 2);

        let first = &bank.questions[0];
        assert_eq!(first.id, Some(QuestionId::Number(1)));
        assert_eq!(first.page, Some(3));
        let labels: Vec<_> = first.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["D", "A", "C", "B"]);
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let bank = parse(VALID_BANK).unwrap();
        let second = &bank.questions[1];
        assert_eq!(second.topic, DEFAULT_TOPIC);
        assert_eq!(second.page, None);
        assert!(second.explanation.is_none());
        assert_eq!(second.correct_answer, "B");
    }

    #[test]
    fn preferred_key_with_malformed_items_falls_back_by_first_element() {
        let content = r#"{
            "questions": [
                {"question": "Q1", "options": {"A": "x", "B": "y"}, "correct_answer": "A"},
                {"question": "Q2"}
            ],
            "backup": [
                {"question": "Q3", "options": {"A": "x", "B": "y"}, "correct_answer": "B"}
            ]
        }"#;
        let bank = parse(content).unwrap();
        assert_eq!(bank.key.as_deref(), Some("questions"));
        assert_eq!(bank.questions.len(), 1);
        assert_eq!(bank.questions[0].question, "Q1");
    }

    #[test]
    fn malformed_first_item_moves_on_to_next_key() {
        let content = r#"{
            "questions": [
                {"question": "Q1"},
                {"question": "Q2", "options": {"A": "x", "B": "y"}, "correct_answer": "A"}
            ],
            "backup": [
                {"question": "Q3", "options": {"A": "x", "B": "y"}, "correct_answer": "B"}
            ]
        }"#;
        let bank = parse(content).unwrap();
        assert_eq!(bank.key.as_deref(), Some("backup"));
        assert_eq!(bank.questions.len(), 1);
        assert_eq!(bank.questions[0].question, "Q3");
    }

    #[test]
    fn non_string_topic_and_explanation_are_stringified() {
        let content = r#"[
            {"topic": 3, "question": "Q1", "options": ["x", "y"], "correct_answer": "A", "explanation": 42},
            {"topic": null, "question": "Q2", "options": ["x", "y"], "correct_answer": "B", "explanation": null}
        ]"#;
        let bank = parse(content).unwrap();
        assert_eq!(bank.questions.len(), 2);
        assert_eq!(bank.questions[0].topic, "3");
        assert_eq!(bank.questions[0].explanation.as_deref(), Some("42"));
        assert_eq!(bank.questions[1].topic, DEFAULT_TOPIC);
        assert!(bank.questions[1].explanation.is_none());
    }

    #[test]
    fn warns_on_labels_that_are_commands() {
        let content = r#"[
            {"question": "Pick", "options": {"M": "x", "N": "y", "Q": "z"}, "correct_answer": "N", "explanation": "e"}
        ]"#;
        let bank = parse(content).unwrap();
        let findings = validate_bank(&bank);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.severity == Severity::Warning));
        assert!(findings[0].message.contains("'N' is also a command"));
        assert!(findings[1].message.contains("answer Q"));
        assert!(!has_errors(&findings));
    }

    #[test]
    fn preferred_keys_are_tried_in_order() {
        let content = r#"{
            "exam_questions": [
                {"question": "late", "options": {"A": "x", "B": "y"}, "correct_answer": "A"}
            ],
            "chemistry_questions": [
                {"question": "early", "options": {"A": "x", "B": "y"}, "correct_answer": "A"}
            ]
        }"#;
        let bank = parse(content).unwrap();
        assert_eq!(bank.key.as_deref(), Some("chemistry_questions"));
    }

    #[test]
    fn fallback_key_skips_malformed_items() {
        let content = r#"{
            "title": "Mixed bag",
            "metadata": {"author": "someone"},
            "items": [
                {"question": "Good", "options": ["yes", "no"], "correct_answer": "A"},
                {"question": "Broken", "options": 42, "correct_answer": "A"},
                "not even an object"
            ]
        }"#;
        let bank = parse(content).unwrap();
        assert_eq!(bank.key.as_deref(), Some("items"));
        assert_eq!(bank.title.as_deref(), Some("Mixed bag"));
        assert_eq!(bank.questions.len(), 1);
        assert_eq!(bank.questions[0].options[1].label, "B");
        assert_eq!(bank.questions[0].options[1].text, "no");
    }

    #[test]
    fn top_level_array_is_accepted() {
        let content = r#"[
            {"id": "q1", "question": "Pick A", "options": {"A": "a", "B": "b"}, "correct_answer": "A", "page": "12"}
        ]"#;
        let bank = parse(content).unwrap();
        assert!(bank.key.is_none());
        assert_eq!(bank.questions[0].id, Some(QuestionId::Text("q1".into())));
        assert_eq!(bank.questions[0].page, Some(12));
    }

    #[test]
    fn no_questions_found() {
        let err = parse(r#"{"questions": [], "other": [1, 2, 3]}"#).unwrap_err();
        assert!(matches!(err, BankError::NoQuestions));

        let err = parse(r#""just a string""#).unwrap_err();
        assert!(matches!(err, BankError::NotAnObject("a string")));
    }

    #[test]
    fn malformed_json() {
        let err = parse("{ not json").unwrap_err();
        assert!(matches!(err, BankError::Json(_)));
    }

    #[test]
    fn validate_flags_bad_answers_and_duplicates() {
        let content = r#"{"questions": [
            {"id": 1, "question": "Q", "options": {"A": "x", "B": "y"}, "correct_answer": "E", "explanation": "e"},
            {"id": 1, "question": "Q", "options": {"A": "x"}, "correct_answer": "A", "explanation": "e"},
            {"id": 2, "question": " ", "options": {"A": "x", "B": "y"}, "correct_answer": "A"}
        ]}"#;
        let bank = parse(content).unwrap();
        let warnings = validate_bank(&bank);

        assert!(warnings.iter().any(|w| w.message.contains("not one of the options")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate question id")));
        assert!(warnings.iter().any(|w| w.message.contains("at least two options")));
        assert!(warnings.iter().any(|w| w.message.contains("question text is empty")));
        assert!(warnings.iter().any(|w| w.message.contains("no explanation")));
        assert!(has_errors(&warnings));
    }

    #[test]
    fn validate_clean_bank() {
        let content = r#"{"questions": [
            {"id": 1, "question": "Q", "options": {"A": "x", "B": "y"}, "correct_answer": "B", "explanation": "because"}
        ]}"#;
        let bank = parse(content).unwrap();
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn parse_bank_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");
        std::fs::write(&path, VALID_BANK).unwrap();

        let bank = parse_bank(&path).unwrap();
        assert_eq!(bank.source, BankSource::File(path));
        assert_eq!(bank.display_title(), "bank");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = parse_bank(&PathBuf::from("definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, BankError::Io { .. }));
    }

    #[test]
    fn default_bank_prefers_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("programming_questions.json");
        std::fs::write(&path, VALID_BANK).unwrap();

        let config = ExamConfig {
            bank_path: path.clone(),
            ..ExamConfig::default()
        };
        let bank = load_default_bank(&config).unwrap();
        assert_eq!(bank.source, BankSource::File(path));
    }

    #[test]
    fn default_bank_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ nope").unwrap();

        for bank_path in [dir.path().join("missing.json"), broken] {
            let config = ExamConfig {
                bank_path,
                ..ExamConfig::default()
            };
            let bank = load_default_bank(&config).unwrap();
            assert_eq!(bank.source, BankSource::Builtin);
        }
    }
}
