//! Saving and restoring sessions as flat JSON files.
//!
//! A snapshot carries the full question list in presentation order, so a
//! resumed session does not depend on the bank file still being around.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{BankSummary, Question, TopicTally};
use crate::session::ExamSession;

/// Current on-disk format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted state of one exam session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    /// Identifier kept across saves of the same session.
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub bank: BankSummary,
    pub questions: Vec<Question>,
    pub answers: Vec<Option<String>>,
    pub current: usize,
    pub answered: bool,
    pub completed: bool,
    #[serde(default)]
    pub topics: TopicTally,
    /// Score at save time. Informational; recomputed from `answers` on restore.
    #[serde(default)]
    pub score: usize,
}

impl SessionSnapshot {
    /// Capture a session for the first time.
    pub fn capture(session: &ExamSession, bank: BankSummary) -> Self {
        let now = Utc::now();
        let mut snapshot = Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            bank,
            questions: Vec::new(),
            answers: Vec::new(),
            current: 0,
            answered: false,
            completed: false,
            topics: TopicTally::default(),
            score: 0,
        };
        snapshot.update(session);
        snapshot
    }

    /// Refresh the stored state from `session`, keeping identity and creation time.
    pub fn update(&mut self, session: &ExamSession) {
        self.updated_at = Utc::now();
        self.questions = session.questions().to_vec();
        self.answers = session.answers().to_vec();
        self.current = session.position();
        self.answered = session.is_answered();
        self.completed = session.is_completed();
        self.topics = session.topics().clone();
        self.score = session.score();
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let corrupt = |msg: String| Err(StoreError::Corrupt(msg));

        if self.questions.is_empty() {
            return corrupt("no questions".into());
        }
        if self.answers.len() != self.questions.len() {
            return corrupt(format!(
                "{} answers for {} questions",
                self.answers.len(),
                self.questions.len()
            ));
        }
        if self.current >= self.questions.len() {
            return corrupt(format!(
                "current question {} out of range (1..={})",
                self.current + 1,
                self.questions.len()
            ));
        }
        for (i, (q, a)) in self.questions.iter().zip(&self.answers).enumerate() {
            if let Some(label) = a {
                if !q.options.iter().any(|o| &o.label == label) {
                    return corrupt(format!("answer '{label}' to question {} is not an option", i + 1));
                }
            }
        }
        if self.answered != self.answers[self.current].is_some() {
            return corrupt("review flag does not match the recorded answer".into());
        }
        if self.completed && self.current + 1 != self.questions.len() {
            return corrupt("completed exam is not positioned on the last question".into());
        }
        Ok(())
    }

    /// Rebuild the session, checking that the stored state is consistent.
    pub fn to_session(&self) -> Result<ExamSession, StoreError> {
        self.check()?;
        let topics = if self.topics.is_empty() {
            TopicTally::from_questions(&self.questions)
        } else {
            self.topics.clone()
        };
        let session = ExamSession::from_parts(
            self.questions.clone(),
            self.answers.clone(),
            self.current,
            self.answered,
            self.completed,
            topics,
        );
        if session.score() != self.score {
            tracing::warn!(
                "stored score {} differs from recorded answers ({}); using answers",
                self.score,
                session.score()
            );
        }
        Ok(session)
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write a snapshot atomically (temp file in the same directory, then rename).
pub fn save_snapshot(path: &Path, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(snapshot).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_error(path))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_error(path))?;
    tmp.write_all(&json).map_err(io_error(path))?;
    tmp.persist(path).map_err(|e| io_error(path)(e.error))?;

    tracing::debug!("saved session {} to {}", snapshot.id, path.display());
    Ok(())
}

/// Read a snapshot from disk.
pub fn load_snapshot(path: &Path) -> Result<SessionSnapshot, StoreError> {
    let content = std::fs::read_to_string(path).map_err(io_error(path))?;
    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a snapshot if the file exists.
pub fn load_if_exists(path: &Path) -> Result<Option<SessionSnapshot>, StoreError> {
    if path.exists() {
        load_snapshot(path).map(Some)
    } else {
        Ok(None)
    }
}

/// Remove a saved session. Returns whether a file was removed.
pub fn discard(path: &Path) -> Result<bool, StoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("removed session file {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_error(path)(e)),
    }
}
