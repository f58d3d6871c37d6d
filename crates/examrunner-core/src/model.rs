//! Core data model types for examrunner.
//!
//! These are the types the rest of the system passes around: questions,
//! question banks, where a bank came from, and per-topic counts.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Topic assigned to questions that don't name one.
pub const DEFAULT_TOPIC: &str = "General";

/// Identifier carried by a question in its source document.
///
/// Banks in the wild use both numeric and string ids, so both are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(u64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{n}"),
            QuestionId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One labelled choice of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Short label the user types (e.g. "A").
    pub label: String,
    /// The option text.
    pub text: String,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier from the source document, if any.
    #[serde(default)]
    pub id: Option<QuestionId>,
    /// Topic used for grouping and per-topic statistics.
    pub topic: String,
    /// The question text.
    pub question: String,
    /// Options in presentation order.
    pub options: Vec<AnswerOption>,
    /// Label of the correct option.
    pub correct_answer: String,
    /// Reference page in the source material.
    #[serde(default)]
    pub page: Option<u32>,
    /// Explanation shown after answering.
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    /// Look up an option by label, ignoring case and surrounding whitespace.
    pub fn option(&self, label: &str) -> Option<&AnswerOption> {
        let label = label.trim();
        self.options
            .iter()
            .find(|o| o.label.eq_ignore_ascii_case(label))
    }

    /// The option marked as correct, if the bank's answer matches a label.
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.label == self.correct_answer)
    }

    /// Whether `label` names the correct option.
    pub fn is_correct(&self, label: &str) -> bool {
        self.option(label)
            .is_some_and(|o| o.label == self.correct_answer)
    }

    pub fn has_explanation(&self) -> bool {
        self.explanation
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty())
    }

    /// Comma-separated option labels, for prompts and error messages.
    pub fn available_labels(&self) -> String {
        self.options
            .iter()
            .map(|o| o.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Where a question bank was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum BankSource {
    /// The set compiled into the binary.
    Builtin,
    /// A JSON file on disk.
    File(PathBuf),
    /// JSON pasted on standard input.
    Stdin,
}

impl fmt::Display for BankSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankSource::Builtin => write!(f, "built-in questions"),
            BankSource::File(path) => write!(f, "{}", path.display()),
            BankSource::Stdin => write!(f, "pasted JSON"),
        }
    }
}

/// A loaded set of questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    /// Optional title from the document.
    pub title: Option<String>,
    /// Where the bank came from.
    pub source: BankSource,
    /// JSON key the question list was found under (`None` for a bare array).
    pub key: Option<String>,
    /// The questions, in document order.
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// Human-readable name: the document title, else one derived from the source.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title.to_string();
        }
        match &self.source {
            BankSource::Builtin => "Built-in exam".to_string(),
            BankSource::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            BankSource::Stdin => "Pasted exam".to_string(),
        }
    }

    pub fn topics(&self) -> TopicTally {
        TopicTally::from_questions(&self.questions)
    }

    pub fn summary(&self) -> BankSummary {
        BankSummary {
            title: self.display_title(),
            source: self.source.clone(),
            key: self.key.clone(),
            question_count: self.questions.len(),
        }
    }
}

/// Summary of a bank (without the questions), embedded in reports and snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSummary {
    pub title: String,
    pub source: BankSource,
    #[serde(default)]
    pub key: Option<String>,
    pub question_count: usize,
}

/// Number of questions for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// Question counts per topic, in the order topics first appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicTally(Vec<TopicCount>);

impl TopicTally {
    pub fn from_questions(questions: &[Question]) -> Self {
        let mut tally = TopicTally::default();
        for q in questions {
            tally.add(&q.topic);
        }
        tally
    }

    fn add(&mut self, topic: &str) {
        match self.0.iter_mut().find(|t| t.topic == topic) {
            Some(entry) => entry.count += 1,
            None => self.0.push(TopicCount {
                topic: topic.to_string(),
                count: 1,
            }),
        }
    }

    /// Number of distinct topics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, topic: &str) -> Option<usize> {
        self.0.iter().find(|t| t.topic == topic).map(|t| t.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicCount> {
        self.0.iter()
    }
}
