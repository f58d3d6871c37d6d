//! Terminal command source and observer for `examrunner take`.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Result;

use examrunner_core::error::SessionError;
use examrunner_core::model::{Question, TopicTally};
use examrunner_core::report::ExamReport;
use examrunner_core::session::{AnswerOutcome, ExamSession, Progress};
use examrunner_core::traits::{Command, CommandSource, ExamObserver};

use crate::render;

/// Reads commands line by line.
pub struct ConsoleSource<R> {
    reader: R,
}

impl<R: BufRead> ConsoleSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> CommandSource for ConsoleSource<R> {
    fn next_command(&mut self, session: &ExamSession) -> Result<Option<Command>> {
        loop {
            if session.is_answered() {
                print!("[next/prev/retry/status/quit] > ");
            } else {
                print!("[{}] > ", session.current_question().available_labels());
            }
            std::io::stdout().flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                println!();
                return Ok(None);
            }
            if let Ok(command) = line.parse() {
                return Ok(Some(command));
            }
        }
    }
}

/// Read pasted JSON up to a line containing only `---`, or to end of input.
pub fn read_pasted_json(reader: &mut impl BufRead) -> Result<String> {
    let mut json = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 || line.trim() == "---" {
            break;
        }
        json.push_str(&line);
    }
    Ok(json)
}

/// Prints engine events to stdout.
pub struct ConsoleObserver;

impl ConsoleObserver {
    fn print_options(question: &Question, chosen: Option<&str>) {
        for opt in &question.options {
            let marker = if chosen.is_none() {
                ""
            } else if opt.label == question.correct_answer {
                "  <- correct answer"
            } else if Some(opt.label.as_str()) == chosen {
                "  <- your answer"
            } else {
                ""
            };
            println!("  {}. {}{}", opt.label, opt.text, marker);
        }
    }

    fn print_review(question: &Question, chosen: &str, explanation: Option<&str>, is_last: bool) {
        println!();
        if question.is_correct(chosen) {
            println!("Correct! Well done!");
        } else {
            println!("Incorrect. The correct answer is {}.", question.correct_answer);
        }
        println!();
        Self::print_options(question, Some(chosen));
        println!();
        match explanation {
            Some(explanation) => println!("Explanation: {explanation}"),
            None => println!("No explanation available for this question."),
        }
        println!();
        if is_last {
            println!("Last question: type `finish` to complete the exam, `prev` or `retry`.");
        } else {
            println!("Type `next` to continue, `prev` to go back, or `retry` to answer again.");
        }
    }
}

impl ExamObserver for ConsoleObserver {
    fn on_question(&self, session: &ExamSession) {
        let q = session.current_question();
        println!();
        println!("Question {}/{}", session.position() + 1, session.total());
        print!("Topic: {}", q.topic);
        if let Some(page) = q.page {
            print!(" | Reference: page {page}");
        }
        println!();
        println!();
        println!("{}", q.question);
        println!();

        match session.current_answer() {
            Some(chosen) => {
                println!("(answered)");
                let explanation = q.explanation.as_deref().filter(|_| q.has_explanation());
                Self::print_review(q, chosen, explanation, session.position() + 1 == session.total());
            }
            None => Self::print_options(q, None),
        }
    }

    fn on_answer(&self, question: &Question, outcome: &AnswerOutcome) {
        Self::print_review(
            question,
            &outcome.chosen,
            outcome.explanation.as_deref(),
            outcome.number == outcome.total,
        );
    }

    fn on_rejected(&self, error: &SessionError) {
        println!("! {error}");
    }

    fn on_progress(&self, progress: &Progress, topics: &TopicTally) {
        render::print_progress(progress);
        render::print_topics(topics);
    }

    fn on_shuffled(&self) {
        println!("Questions shuffled!");
    }

    fn on_saved(&self, path: &Path) {
        println!("Progress saved to {}", path.display());
    }

    fn on_help(&self) {
        println!("{HELP}");
    }

    fn on_complete(&self, report: &ExamReport) {
        println!();
        println!("Exam completed!");
        render::print_report(report);
    }
}

const HELP: &str = "\
Commands:
  <label>            answer the current question (e.g. A)
  answer <label>     answer with a label that is also a command (e.g. answer N)
  next, n, >         go to the next question
  prev, p, <         go back to the previous question
  retry              clear your answer and answer again
  finish             complete the exam (from the last question)
  shuffle            shuffle the questions and return to the first
  restart            clear all answers and start over
  status             show score, progress and topics
  save               save progress now
  quit, q            save and quit";
