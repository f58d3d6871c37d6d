//! Seams between the exam engine and its front end.
//!
//! The engine pulls [`Command`]s from a [`CommandSource`] and reports what
//! happened to an [`ExamObserver`]. The CLI implements both over the
//! terminal; tests use scripted sources.

use std::path::Path;
use std::str::FromStr;

use crate::error::SessionError;
use crate::model::{Question, TopicTally};
use crate::report::ExamReport;
use crate::session::{AnswerOutcome, ExamSession, Progress};

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit an option label.
    Answer(String),
    Next,
    Previous,
    /// Clear the current answer and answer again.
    Retry,
    Shuffle,
    Restart,
    Finish,
    /// Show score and topic breakdown.
    Status,
    Save,
    Quit,
    Help,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty command".into());
        }
        // `answer <label>` reaches options whose label is also a command word.
        if let Some((word, label)) = s.split_once(char::is_whitespace) {
            if word.eq_ignore_ascii_case("answer") && !label.trim().is_empty() {
                return Ok(Command::Answer(label.trim().to_string()));
            }
        }
        Ok(match s.to_lowercase().as_str() {
            "next" | "n" | ">" => Command::Next,
            "prev" | "previous" | "p" | "<" => Command::Previous,
            "retry" | "again" => Command::Retry,
            "shuffle" => Command::Shuffle,
            "restart" => Command::Restart,
            "finish" | "done" => Command::Finish,
            "status" | "score" => Command::Status,
            "save" => Command::Save,
            "quit" | "exit" | "q" => Command::Quit,
            "help" | "?" => Command::Help,
            _ => Command::Answer(s.to_string()),
        })
    }
}

/// Supplies user commands to the engine.
pub trait CommandSource {
    /// The next command, or `None` when input is exhausted.
    fn next_command(&mut self, session: &ExamSession) -> anyhow::Result<Option<Command>>;
}

/// Receives engine events for display.
pub trait ExamObserver {
    /// A question is ready to be shown (either awaiting an answer or in review).
    fn on_question(&self, session: &ExamSession);
    /// An answer was recorded.
    fn on_answer(&self, question: &Question, outcome: &AnswerOutcome);
    /// A command was not allowed in the current state.
    fn on_rejected(&self, error: &SessionError);
    fn on_progress(&self, progress: &Progress, topics: &TopicTally);
    fn on_shuffled(&self);
    fn on_saved(&self, path: &Path);
    fn on_help(&self);
    fn on_complete(&self, report: &ExamReport);
}

/// No-op observer.
pub struct NoopObserver;

impl ExamObserver for NoopObserver {
    fn on_question(&self, _: &ExamSession) {}
    fn on_answer(&self, _: &Question, _: &AnswerOutcome) {}
    fn on_rejected(&self, _: &SessionError) {}
    fn on_progress(&self, _: &Progress, _: &TopicTally) {}
    fn on_shuffled(&self) {}
    fn on_saved(&self, _: &Path) {}
    fn on_help(&self) {}
    fn on_complete(&self, _: &ExamReport) {}
}
