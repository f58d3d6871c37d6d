//! Exam engine: drives a session from a command source.
//!
//! Every state change is written to the configured session file, so an exam
//! can be interrupted at any point and resumed later.

use std::path::PathBuf;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ExamConfig;
use crate::error::StoreError;
use crate::model::BankSummary;
use crate::report::ExamReport;
use crate::session::ExamSession;
use crate::store::{self, SessionSnapshot};
use crate::traits::{Command, CommandSource, ExamObserver};

/// Configuration for the exam engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where to persist the session (`None` keeps it in memory only).
    pub state_path: Option<PathBuf>,
    /// Shuffle on `restart`.
    pub shuffle: bool,
    /// Keep the session file once the exam is finished.
    pub keep_completed: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state_path: None,
            shuffle: true,
            keep_completed: false,
        }
    }
}

impl From<&ExamConfig> for EngineConfig {
    fn from(config: &ExamConfig) -> Self {
        Self {
            state_path: Some(config.state_path.clone()),
            shuffle: config.shuffle,
            keep_completed: config.keep_completed,
        }
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum EngineOutcome {
    /// The exam was finished.
    Completed(Box<ExamReport>),
    /// The user quit or input ran out; progress is saved if a state path is set.
    Suspended,
}

/// Build the RNG, seeded when a seed is configured.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// What the loop should do after a command.
enum Flow {
    Continue,
    Quit,
    Completed(Box<ExamReport>),
}

/// The exam engine.
pub struct ExamEngine {
    session: ExamSession,
    snapshot: SessionSnapshot,
    rng: StdRng,
    config: EngineConfig,
}

impl ExamEngine {
    /// Wrap a freshly started session.
    pub fn new(session: ExamSession, bank: BankSummary, rng: StdRng, config: EngineConfig) -> Self {
        let snapshot = SessionSnapshot::capture(&session, bank);
        Self {
            session,
            snapshot,
            rng,
            config,
        }
    }

    /// Continue a saved session.
    pub fn resume(
        snapshot: SessionSnapshot,
        rng: StdRng,
        config: EngineConfig,
    ) -> Result<Self, StoreError> {
        let session = snapshot.to_session()?;
        tracing::info!(
            "resuming session {} at question {}/{}",
            snapshot.id,
            session.position() + 1,
            session.total()
        );
        Ok(Self {
            session,
            snapshot,
            rng,
            config,
        })
    }

    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    pub fn bank(&self) -> &BankSummary {
        &self.snapshot.bank
    }

    /// Build a report for the session as it stands.
    pub fn report(&self) -> ExamReport {
        ExamReport::from_session(&self.session, self.snapshot.bank.clone())
    }

    /// Persist the current state, if a state path is configured.
    pub fn save(&mut self) -> Result<Option<PathBuf>> {
        let Some(path) = &self.config.state_path else {
            return Ok(None);
        };
        self.snapshot.update(&self.session);
        store::save_snapshot(path, &self.snapshot)?;
        Ok(Some(path.clone()))
    }

    /// Run the command loop until the exam is finished or input ends.
    pub fn run(
        &mut self,
        source: &mut dyn CommandSource,
        observer: &dyn ExamObserver,
    ) -> Result<EngineOutcome> {
        if self.session.is_completed() {
            let report = self.report();
            observer.on_complete(&report);
            return Ok(EngineOutcome::Completed(Box::new(report)));
        }

        self.save()?;
        observer.on_question(&self.session);

        loop {
            let Some(command) = source.next_command(&self.session)? else {
                tracing::debug!("input ended; suspending session");
                self.save()?;
                return Ok(EngineOutcome::Suspended);
            };

            match self.apply(command, observer)? {
                Flow::Continue => {}
                Flow::Quit => return Ok(EngineOutcome::Suspended),
                Flow::Completed(report) => return Ok(EngineOutcome::Completed(report)),
            }
        }
    }

    fn apply(&mut self, command: Command, observer: &dyn ExamObserver) -> Result<Flow> {
        tracing::trace!("command: {:?}", command);

        // The answer outcome is the display for a submitted answer.
        let show_question = !matches!(command, Command::Answer(_));

        let result = match command {
            Command::Answer(label) => self
                .session
                .submit(&label)
                .map(|outcome| observer.on_answer(self.session.current_question(), &outcome)),
            Command::Next => self.session.next(),
            Command::Previous => self.session.previous(),
            Command::Retry => self.session.retry(),
            Command::Shuffle => self.session.shuffle(&mut self.rng).map(|()| observer.on_shuffled()),
            Command::Restart => {
                self.session.restart(self.config.shuffle, &mut self.rng);
                Ok(())
            }
            Command::Finish => self.session.finish(),
            Command::Status => {
                observer.on_progress(&self.session.progress(), self.session.topics());
                return Ok(Flow::Continue);
            }
            Command::Help => {
                observer.on_help();
                return Ok(Flow::Continue);
            }
            Command::Save => {
                if let Some(path) = self.save()? {
                    observer.on_saved(&path);
                }
                return Ok(Flow::Continue);
            }
            Command::Quit => {
                if let Some(path) = self.save()? {
                    observer.on_saved(&path);
                }
                return Ok(Flow::Quit);
            }
        };

        if let Err(e) = result {
            observer.on_rejected(&e);
            return Ok(Flow::Continue);
        }

        if self.session.is_completed() {
            return self.complete(observer).map(Flow::Completed);
        }

        self.save()?;
        if show_question {
            observer.on_question(&self.session);
        }
        Ok(Flow::Continue)
    }

    fn complete(&mut self, observer: &dyn ExamObserver) -> Result<Box<ExamReport>> {
        let report = self.report();
        if self.config.keep_completed {
            self.save()?;
        } else if let Some(path) = &self.config.state_path {
            store::discard(path)?;
        }
        observer.on_complete(&report);
        Ok(Box::new(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::path::Path;

    use crate::error::SessionError;
    use crate::model::tests::make_question;
    use crate::model::{BankSource, Question, TopicTally};
    use crate::session::{AnswerOutcome, Progress};
    use crate::traits::NoopObserver;

    struct Scripted(VecDeque<Command>);

    impl Scripted {
        fn new(lines: &[&str]) -> Self {
            Self(lines.iter().map(|l| l.parse().unwrap()).collect())
        }
    }

    impl CommandSource for Scripted {
        fn next_command(&mut self, _: &ExamSession) -> Result<Option<Command>> {
            Ok(self.0.pop_front())
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl Recorder {
        fn push(&self, event: String) {
            self.events.borrow_mut().push(event);
        }
    }

    impl ExamObserver for Recorder {
        fn on_question(&self, session: &ExamSession) {
            self.push(format!("question {}", session.position() + 1));
        }
        fn on_answer(&self, _: &Question, outcome: &AnswerOutcome) {
            self.push(format!("answer {} {}", outcome.chosen, outcome.correct));
        }
        fn on_rejected(&self, error: &SessionError) {
            self.push(format!("rejected {error}"));
        }
        fn on_progress(&self, progress: &Progress, _: &TopicTally) {
            self.push(format!("progress {}/{}", progress.score, progress.answered));
        }
        fn on_shuffled(&self) {
            self.push("shuffled".into());
        }
        fn on_saved(&self, _: &Path) {
            self.push("saved".into());
        }
        fn on_help(&self) {
            self.push("help".into());
        }
        fn on_complete(&self, report: &ExamReport) {
            self.push(format!("complete {}/{}", report.correct, report.total));
        }
    }

    fn bank() -> BankSummary {
        BankSummary {
            title: "Engine".into(),
            source: BankSource::Stdin,
            key: None,
            question_count: 2,
        }
    }

    fn engine(state_path: Option<PathBuf>, keep_completed: bool) -> ExamEngine {
        let questions = vec![make_question("Ownership", "A"), make_question("Traits", "B")];
        let mut rng = make_rng(Some(11));
        let session = ExamSession::new(questions, false, &mut rng).unwrap();
        ExamEngine::new(
            session,
            bank(),
            rng,
            EngineConfig {
                state_path,
                shuffle: false,
                keep_completed,
            },
        )
    }

    #[test]
    fn full_run_completes() {
        let mut engine = engine(None, false);
        let recorder = Recorder::default();
        let mut source = Scripted::new(&["a", "next", "c", "retry", "b", "finish"]);

        let outcome = engine.run(&mut source, &recorder).unwrap();
        let EngineOutcome::Completed(report) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(report.correct, 2);
        assert_eq!(
            recorder.events.borrow().last().map(String::as_str),
            Some("complete 2/2")
        );
        assert!(recorder
            .events
            .borrow()
            .iter()
            .any(|e| e == "answer C false"));
    }

    #[test]
    fn rejected_commands_are_reported() {
        let mut engine = engine(None, false);
        let recorder = Recorder::default();
        let mut source = Scripted::new(&["next", "z", "prev", "status", "help"]);

        let outcome = engine.run(&mut source, &recorder).unwrap();
        assert!(matches!(outcome, EngineOutcome::Suspended));

        let events = recorder.events.borrow();
        assert_eq!(events.iter().filter(|e| e.starts_with("rejected")).count(), 3);
        assert!(events.contains(&"progress 0/0".to_string()));
        assert!(events.contains(&"help".to_string()));
    }

    #[test]
    fn restart_clears_answers_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut engine = engine(Some(path.clone()), false);
        let recorder = Recorder::default();
        let mut source = Scripted::new(&["a", "restart", "status", "save"]);

        let outcome = engine.run(&mut source, &recorder).unwrap();
        assert!(matches!(outcome, EngineOutcome::Suspended));
        assert_eq!(engine.session().answered_count(), 0);
        assert_eq!(engine.session().position(), 0);
        assert!(!engine.session().is_answered());

        let events = recorder.events.borrow();
        assert_eq!(
            *events,
            vec![
                "question 1",
                "answer A true",
                "question 1",
                "progress 0/0",
                "saved",
            ]
        );

        let snapshot = store::load_snapshot(&path).unwrap();
        assert!(snapshot.answers.iter().all(Option::is_none));
        assert_eq!(snapshot.current, 0);
    }

    #[test]
    fn quit_saves_and_resume_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut first = engine(Some(path.clone()), false);
        let outcome = first
            .run(&mut Scripted::new(&["a", "next", "quit"]), &NoopObserver)
            .unwrap();
        assert!(matches!(outcome, EngineOutcome::Suspended));
        assert!(path.exists());

        let snapshot = store::load_snapshot(&path).unwrap();
        let mut resumed = ExamEngine::resume(
            snapshot,
            make_rng(Some(1)),
            EngineConfig {
                state_path: Some(path.clone()),
                shuffle: false,
                keep_completed: false,
            },
        )
        .unwrap();
        assert_eq!(resumed.session().position(), 1);
        assert_eq!(resumed.session().score(), 1);

        let outcome = resumed
            .run(&mut Scripted::new(&["b", "finish"]), &NoopObserver)
            .unwrap();
        assert!(matches!(outcome, EngineOutcome::Completed(_)));
        assert!(!path.exists(), "finished session file should be removed");
    }

    #[test]
    fn keep_completed_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut engine = engine(Some(path.clone()), true);
        engine
            .run(&mut Scripted::new(&["a", "next", "b", "finish"]), &NoopObserver)
            .unwrap();

        let snapshot = store::load_snapshot(&path).unwrap();
        assert!(snapshot.completed);
        assert_eq!(snapshot.score, 2);

        // A completed session reports immediately on resume.
        let mut resumed = ExamEngine::resume(snapshot, make_rng(None), EngineConfig::default()).unwrap();
        let outcome = resumed.run(&mut Scripted::new(&[]), &NoopObserver).unwrap();
        assert!(matches!(outcome, EngineOutcome::Completed(_)));
    }

    #[test]
    fn end_of_input_suspends() {
        let mut engine = engine(None, false);
        let outcome = engine.run(&mut Scripted::new(&["a"]), &NoopObserver).unwrap();
        assert!(matches!(outcome, EngineOutcome::Suspended));
        assert_eq!(engine.session().answered_count(), 1);
    }

    #[test]
    fn shuffle_is_announced() {
        let mut engine = engine(None, false);
        let recorder = Recorder::default();
        engine
            .run(&mut Scripted::new(&["shuffle"]), &recorder)
            .unwrap();
        assert!(recorder.events.borrow().contains(&"shuffled".to_string()));
    }
}
