//! Exam report types with JSON persistence and markdown rendering.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerOption, BankSummary, QuestionId};
use crate::session::ExamSession;

/// Performance band derived from the final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Outstanding,
    Excellent,
    VeryGood,
    Good,
    KeepStudying,
}

impl PerformanceBand {
    pub fn from_percentage(pct: f64) -> Self {
        match pct {
            p if p >= 90.0 => PerformanceBand::Outstanding,
            p if p >= 80.0 => PerformanceBand::Excellent,
            p if p >= 70.0 => PerformanceBand::VeryGood,
            p if p >= 60.0 => PerformanceBand::Good,
            _ => PerformanceBand::KeepStudying,
        }
    }

    /// One-line message shown with the final score.
    pub fn headline(&self) -> &'static str {
        match self {
            PerformanceBand::Outstanding => "Outstanding! Subject expert!",
            PerformanceBand::Excellent => "Excellent! Strong understanding of the concepts!",
            PerformanceBand::VeryGood => "Very good! Solid knowledge base!",
            PerformanceBand::Good => "Good! Review the challenging topics!",
            PerformanceBand::KeepStudying => "Keep studying! Focus on the fundamentals!",
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceBand::Outstanding => write!(f, "outstanding"),
            PerformanceBand::Excellent => write!(f, "excellent"),
            PerformanceBand::VeryGood => write!(f, "very good"),
            PerformanceBand::Good => write!(f, "good"),
            PerformanceBand::KeepStudying => write!(f, "keep studying"),
        }
    }
}

/// How a single question went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
}

/// Per-question entry of the detailed review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionReview {
    /// 1-based position in presentation order.
    pub number: usize,
    #[serde(default)]
    pub id: Option<QuestionId>,
    pub topic: String,
    #[serde(default)]
    pub page: Option<u32>,
    pub question: String,
    /// The option the user picked.
    #[serde(default)]
    pub chosen: Option<AnswerOption>,
    pub correct_answer: String,
    /// Text of the correct option, when the label exists.
    #[serde(default)]
    pub correct_text: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    pub verdict: Verdict,
}

/// Aggregate results for one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicStats {
    pub topic: String,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    /// `correct / total` as a percentage.
    pub percentage: f64,
}

/// A complete exam report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the question bank.
    pub bank: BankSummary,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    /// `correct / total` as a percentage.
    pub percentage: f64,
    pub band: PerformanceBand,
    /// Whether the exam was finished (false for a report on a saved, partial session).
    pub completed: bool,
    pub per_topic: Vec<TopicStats>,
    pub reviews: Vec<QuestionReview>,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl ExamReport {
    /// Build a report from the current state of a session.
    pub fn from_session(session: &ExamSession, bank: BankSummary) -> Self {
        let reviews: Vec<QuestionReview> = session
            .questions()
            .iter()
            .zip(session.answers())
            .enumerate()
            .map(|(i, (q, answer))| {
                let chosen = answer.as_deref().and_then(|a| q.option(a)).cloned();
                let verdict = match &chosen {
                    None => Verdict::Unanswered,
                    Some(opt) if opt.label == q.correct_answer => Verdict::Correct,
                    Some(_) => Verdict::Incorrect,
                };
                QuestionReview {
                    number: i + 1,
                    id: q.id.clone(),
                    topic: q.topic.clone(),
                    page: q.page,
                    question: q.question.clone(),
                    chosen,
                    correct_answer: q.correct_answer.clone(),
                    correct_text: q.correct_option().map(|o| o.text.clone()),
                    explanation: q.explanation.clone(),
                    verdict,
                }
            })
            .collect();

        let per_topic = session
            .topics()
            .iter()
            .map(|t| {
                let in_topic = reviews.iter().filter(|r| r.topic == t.topic);
                let answered = in_topic
                    .clone()
                    .filter(|r| r.verdict != Verdict::Unanswered)
                    .count();
                let correct = in_topic.filter(|r| r.verdict == Verdict::Correct).count();
                TopicStats {
                    topic: t.topic.clone(),
                    total: t.count,
                    answered,
                    correct,
                    percentage: percent(correct, t.count),
                }
            })
            .collect();

        let total = session.total();
        let correct = session.score();
        let percentage = percent(correct, total);

        ExamReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank,
            total,
            answered: session.answered_count(),
            correct,
            percentage,
            band: PerformanceBand::from_percentage(percentage),
            completed: session.is_completed(),
            per_topic,
            reviews,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ExamReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Reviews the user got wrong or skipped.
    pub fn missed(&self) -> impl Iterator<Item = &QuestionReview> {
        self.reviews.iter().filter(|r| r.verdict != Verdict::Correct)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.bank.title));
        if !self.completed {
            md.push_str("_Exam in progress._\n\n");
        }
        md.push_str(&format!(
            "**Score:** {}/{} ({:.1}%), {} answered\n\n",
            self.correct, self.total, self.percentage, self.answered
        ));
        md.push_str(&format!("**{}**\n\n", self.band.headline()));

        if !self.per_topic.is_empty() {
            md.push_str("## Topics\n\n");
            md.push_str("| Topic | Questions | Answered | Correct | Score |\n");
            md.push_str("|-------|-----------|----------|---------|-------|\n");
            for t in &self.per_topic {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {:.1}% |\n",
                    t.topic, t.total, t.answered, t.correct, t.percentage
                ));
            }
            md.push('\n');
        }

        md.push_str("## Review\n\n");
        for r in &self.reviews {
            let mark = match r.verdict {
                Verdict::Correct => "correct",
                Verdict::Incorrect => "incorrect",
                Verdict::Unanswered => "not answered",
            };
            md.push_str(&format!("### {}. {} ({mark})\n\n", r.number, r.question));
            md.push_str(&format!("- Topic: {}\n", r.topic));
            if let Some(page) = r.page {
                md.push_str(&format!("- Reference: page {page}\n"));
            }
            match &r.chosen {
                Some(opt) => md.push_str(&format!("- Your answer: {}. {}\n", opt.label, opt.text)),
                None => md.push_str("- Your answer: not answered\n"),
            }
            md.push_str(&format!(
                "- Correct answer: {}. {}\n",
                r.correct_answer,
                r.correct_text.as_deref().unwrap_or("")
            ));
            if let Some(explanation) = &r.explanation {
                md.push_str(&format!("\n> {explanation}\n"));
            }
            md.push('\n');
        }

        md
    }
}
