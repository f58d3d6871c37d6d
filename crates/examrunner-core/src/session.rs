//! Exam session state.
//!
//! A session walks a cursor over the questions in presentation order. Each
//! question is either awaiting an answer or, once answered, in review state
//! where the verdict and explanation are shown and the user may move on,
//! go back, or retry. The score is always derived from the recorded answers.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::{Question, TopicTally};

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// 1-based question number in presentation order.
    pub number: usize,
    /// Number of questions in the session.
    pub total: usize,
    /// Canonical label of the chosen option.
    pub chosen: String,
    /// Label of the correct option.
    pub correct_answer: String,
    pub correct: bool,
    /// Explanation to show with the verdict, if the bank has one.
    pub explanation: Option<String>,
}

/// Progress figures for status lines and sidebars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Questions with a recorded answer.
    pub answered: usize,
    pub total: usize,
    /// Correct answers so far.
    pub score: usize,
    /// `score / answered` as a percentage (0 when nothing is answered).
    pub accuracy_pct: f64,
    /// Share of the exam covered, in `0.0..=1.0`.
    pub fraction: f64,
    pub completed: bool,
}

/// An exam in progress.
#[derive(Debug, Clone)]
pub struct ExamSession {
    questions: Vec<Question>,
    answers: Vec<Option<String>>,
    current: usize,
    answered: bool,
    completed: bool,
    topics: TopicTally,
}

impl ExamSession {
    /// Start a session over `questions`, shuffling them first if asked.
    pub fn new<R: Rng + ?Sized>(
        mut questions: Vec<Question>,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyBank);
        }
        // Topics are tallied in document order, before shuffling.
        let topics = TopicTally::from_questions(&questions);
        if shuffle {
            questions.shuffle(rng);
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            questions,
            answers,
            current: 0,
            answered: false,
            completed: false,
            topics,
        })
    }

    /// Rebuild a session from persisted parts. Consistency is checked by the caller.
    pub(crate) fn from_parts(
        questions: Vec<Question>,
        answers: Vec<Option<String>>,
        current: usize,
        answered: bool,
        completed: bool,
        topics: TopicTally,
    ) -> Self {
        Self {
            questions,
            answers,
            current,
            answered,
            completed,
            topics,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    pub fn topics(&self) -> &TopicTally {
        &self.topics
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// 0-based index of the current question.
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    /// Answer recorded for the current question, if any.
    pub fn current_answer(&self) -> Option<&str> {
        self.answers[self.current].as_deref()
    }

    /// Whether the current question is in review state.
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.completed {
            Err(SessionError::Completed)
        } else {
            Ok(())
        }
    }

    fn ensure_reviewing(&self) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.answered {
            Ok(())
        } else {
            Err(SessionError::NotAnswered(self.current + 1))
        }
    }

    /// Record an answer for the current question.
    pub fn submit(&mut self, label: &str) -> Result<AnswerOutcome, SessionError> {
        self.ensure_open()?;
        if self.answered {
            return Err(SessionError::AlreadyAnswered(self.current + 1));
        }

        let question = &self.questions[self.current];
        let chosen = question
            .option(label)
            .map(|o| o.label.clone())
            .ok_or_else(|| SessionError::UnknownOption {
                label: label.trim().to_string(),
                available: question.available_labels(),
            })?;
        let correct = chosen == question.correct_answer;
        let outcome = AnswerOutcome {
            number: self.current + 1,
            total: self.questions.len(),
            chosen: chosen.clone(),
            correct_answer: question.correct_answer.clone(),
            correct,
            explanation: question.explanation.clone().filter(|_| question.has_explanation()),
        };

        tracing::debug!(
            "question {} answered {} ({})",
            outcome.number,
            chosen,
            if correct { "correct" } else { "incorrect" }
        );
        self.answers[self.current] = Some(chosen);
        self.answered = true;
        Ok(outcome)
    }

    /// Discard the current answer so the question can be answered again.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        self.ensure_reviewing()?;
        self.answers[self.current] = None;
        self.answered = false;
        Ok(())
    }

    /// Move to the next question.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.ensure_reviewing()?;
        if self.is_last() {
            return Err(SessionError::AtLastQuestion);
        }
        self.current += 1;
        self.answered = self.answers[self.current].is_some();
        Ok(())
    }

    /// Move back to the previous question.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.current == 0 {
            return Err(SessionError::AtFirstQuestion);
        }
        self.current -= 1;
        self.answered = self.answers[self.current].is_some();
        Ok(())
    }

    /// Complete the exam from the answered last question.
    pub fn finish(&mut self) -> Result<(), SessionError> {
        self.ensure_reviewing()?;
        if !self.is_last() {
            return Err(SessionError::NotAtLastQuestion);
        }
        self.completed = true;
        tracing::info!("exam completed: {}/{}", self.score(), self.total());
        Ok(())
    }

    /// Reorder the questions, keeping each answer with its question, and
    /// return to the first one.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        self.ensure_open()?;
        let mut pairs: Vec<(Question, Option<String>)> = std::mem::take(&mut self.questions)
            .into_iter()
            .zip(std::mem::take(&mut self.answers))
            .collect();
        pairs.shuffle(rng);
        let (questions, answers): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        self.questions = questions;
        self.answers = answers;
        self.current = 0;
        self.answered = self.answers[0].is_some();
        Ok(())
    }

    /// Clear every answer and start over with the same questions.
    pub fn restart<R: Rng + ?Sized>(&mut self, shuffle: bool, rng: &mut R) {
        if shuffle {
            self.questions.shuffle(rng);
        }
        self.answers = vec![None; self.questions.len()];
        self.current = 0;
        self.answered = false;
        self.completed = false;
    }

    /// Number of recorded answers that match the correct option.
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.as_deref().is_some_and(|a| a == q.correct_answer))
            .count()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn progress(&self) -> Progress {
        let answered = self.answered_count();
        let total = self.total();
        let score = self.score();
        let accuracy_pct = if answered > 0 {
            score as f64 / answered as f64 * 100.0
        } else {
            0.0
        };
        let fraction = if self.completed {
            1.0
        } else {
            answered as f64 / total as f64
        };
        Progress {
            answered,
            total,
            score,
            accuracy_pct,
            fraction,
            completed: self.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::make_question;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn three_questions() -> Vec<Question> {
        vec![
            make_question("Ownership", "A"),
            make_question("Traits", "B"),
            make_question("Ownership", "C"),
        ]
    }

    fn session() -> ExamSession {
        ExamSession::new(three_questions(), false, &mut rng()).unwrap()
    }

    #[test]
    fn empty_bank_is_rejected() {
        let err = ExamSession::new(vec![], true, &mut rng()).unwrap_err();
        assert_eq!(err, SessionError::EmptyBank);
    }

    #[test]
    fn submit_scores_and_enters_review() {
        let mut s = session();
        let outcome = s.submit("a").unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.chosen, "A");
        assert_eq!(outcome.number, 1);
        assert!(s.is_answered());
        assert_eq!(s.score(), 1);
        assert_eq!(s.current_answer(), Some("A"));
    }

    #[test]
    fn wrong_answer_is_recorded_without_score() {
        let mut s = session();
        let outcome = s.submit("D").unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_answer, "A");
        assert_eq!(outcome.explanation.as_deref(), Some("A is right."));
        assert_eq!(s.score(), 0);
        assert_eq!(s.answered_count(), 1);
    }

    #[test]
    fn cannot_answer_twice() {
        let mut s = session();
        s.submit("A").unwrap();
        assert_eq!(s.submit("B").unwrap_err(), SessionError::AlreadyAnswered(1));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut s = session();
        let err = s.submit("Z").unwrap_err();
        assert!(matches!(err, SessionError::UnknownOption { .. }));
        assert!(!s.is_answered());
    }

    #[test]
    fn retry_does_not_inflate_score() {
        let mut s = session();
        s.submit("A").unwrap();
        s.retry().unwrap();
        assert_eq!(s.score(), 0);
        s.submit("A").unwrap();
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn navigation_requires_an_answer() {
        let mut s = session();
        assert_eq!(s.next().unwrap_err(), SessionError::NotAnswered(1));
        assert_eq!(s.previous().unwrap_err(), SessionError::AtFirstQuestion);
        s.submit("A").unwrap();
        s.next().unwrap();
        assert_eq!(s.position(), 1);
        assert!(!s.is_answered());
    }

    #[test]
    fn previous_returns_to_review_state() {
        let mut s = session();
        s.submit("A").unwrap();
        s.next().unwrap();
        s.previous().unwrap();
        assert_eq!(s.position(), 0);
        assert!(s.is_answered());
        // Going forward again lands on the unanswered question.
        s.next().unwrap();
        assert!(!s.is_answered());
    }

    #[test]
    fn finish_only_from_last_question() {
        let mut s = session();
        s.submit("A").unwrap();
        assert_eq!(s.finish().unwrap_err(), SessionError::NotAtLastQuestion);
        s.next().unwrap();
        s.submit("B").unwrap();
        s.next().unwrap();
        s.submit("D").unwrap();
        assert_eq!(s.next().unwrap_err(), SessionError::AtLastQuestion);
        s.finish().unwrap();

        assert!(s.is_completed());
        assert_eq!(s.score(), 2);
        assert_eq!(s.submit("A").unwrap_err(), SessionError::Completed);
        assert_eq!(s.previous().unwrap_err(), SessionError::Completed);

        let progress = s.progress();
        assert_eq!(progress.fraction, 1.0);
        assert_eq!(progress.answered, 3);
    }

    #[test]
    fn shuffle_keeps_answers_with_their_questions() {
        let mut questions = three_questions();
        for (i, q) in questions.iter_mut().enumerate() {
            q.question = format!("question {i}");
        }
        let mut s = ExamSession::new(questions, false, &mut rng()).unwrap();
        s.submit("A").unwrap();
        s.next().unwrap();
        s.submit("A").unwrap();

        s.shuffle(&mut rng()).unwrap();
        assert_eq!(s.position(), 0);
        assert_eq!(s.score(), 1);
        assert_eq!(s.answered_count(), 2);
        for (q, a) in s.questions().iter().zip(s.answers()) {
            match q.question.as_str() {
                "question 0" | "question 1" => assert_eq!(a.as_deref(), Some("A")),
                _ => assert!(a.is_none()),
            }
        }
        assert_eq!(s.is_answered(), s.current_answer().is_some());
    }

    #[test]
    fn restart_clears_everything() {
        let mut s = session();
        s.submit("A").unwrap();
        s.next().unwrap();
        s.restart(false, &mut rng());
        assert_eq!(s.position(), 0);
        assert_eq!(s.answered_count(), 0);
        assert!(!s.is_answered());
        assert!(!s.is_completed());
    }

    #[test]
    fn restart_with_shuffle_reorders_same_questions() {
        let questions: Vec<Question> = (0..20)
            .map(|i| {
                let mut q = make_question("Ownership", "A");
                q.question = format!("Q{i}");
                q
            })
            .collect();
        let texts = |s: &ExamSession| -> Vec<String> {
            s.questions().iter().map(|q| q.question.clone()).collect()
        };

        let reordered = (0..10).any(|seed| {
            let mut s = ExamSession::new(questions.clone(), false, &mut rng()).unwrap();
            let before = texts(&s);
            s.submit("A").unwrap();
            s.restart(true, &mut StdRng::seed_from_u64(seed));

            let after = texts(&s);
            let mut sorted_before = before.clone();
            let mut sorted_after = after.clone();
            sorted_before.sort();
            sorted_after.sort();
            assert_eq!(sorted_before, sorted_after);
            assert_eq!(s.answered_count(), 0);
            assert_eq!(s.position(), 0);
            after != before
        });
        assert!(reordered);
    }

    #[test]
    fn progress_accuracy() {
        let mut s = session();
        assert_eq!(s.progress().accuracy_pct, 0.0);
        s.submit("A").unwrap();
        s.next().unwrap();
        s.submit("C").unwrap();
        let p = s.progress();
        assert_eq!(p.answered, 2);
        assert_eq!(p.score, 1);
        assert!((p.accuracy_pct - 50.0).abs() < 1e-9);
        assert!((p.fraction - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn topics_counted_before_shuffle() {
        let s = ExamSession::new(three_questions(), true, &mut rng()).unwrap();
        let order: Vec<_> = s.topics().iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(order, vec!["Ownership", "Traits"]);
        assert_eq!(s.topics().get("Ownership"), Some(2));
    }
}
