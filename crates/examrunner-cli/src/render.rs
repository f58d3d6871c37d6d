//! Terminal rendering and report export shared by the commands.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examrunner_core::model::TopicTally;
use examrunner_core::report::{ExamReport, Verdict};
use examrunner_core::session::Progress;
use examrunner_report::html::write_html_report;

const BAR_WIDTH: usize = 30;

fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round()) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn print_progress(progress: &Progress) {
    println!();
    println!("Score: {}/{}", progress.score, progress.answered);
    println!("Accuracy: {:.1}%", progress.accuracy_pct);
    println!(
        "Progress: {} {}/{}",
        progress_bar(progress.fraction),
        progress.answered,
        progress.total
    );
}

pub fn print_topics(topics: &TopicTally) {
    let mut table = Table::new();
    table.set_header(vec!["Topic", "Questions"]);
    for t in topics.iter() {
        table.add_row(vec![Cell::new(&t.topic), Cell::new(t.count)]);
    }
    println!("\n{table}");
}

/// Final results, per-topic breakdown, and a compact review.
pub fn print_report(report: &ExamReport) {
    let mut summary = Table::new();
    summary.set_header(vec!["Total Questions", "Answered", "Correct Answers", "Final Score"]);
    summary.add_row(vec![
        Cell::new(report.total),
        Cell::new(report.answered),
        Cell::new(report.correct),
        Cell::new(format!("{:.1}%", report.percentage)),
    ]);
    println!("\n{summary}");
    println!(
        "\nFinal score: {}/{} ({:.1}%)",
        report.correct, report.total, report.percentage
    );
    println!("{}", report.band.headline());

    let mut topics = Table::new();
    topics.set_header(vec!["Topic", "Questions", "Correct", "Score"]);
    for t in &report.per_topic {
        topics.add_row(vec![
            Cell::new(&t.topic),
            Cell::new(t.total),
            Cell::new(t.correct),
            Cell::new(format!("{:.1}%", t.percentage)),
        ]);
    }
    println!("\n{topics}");

    let missed = report.missed().count();
    println!("\nDetailed answer review ({missed} missed):");
    for r in &report.reviews {
        let mark = match r.verdict {
            Verdict::Correct => "correct",
            Verdict::Incorrect => "incorrect",
            Verdict::Unanswered => "not answered",
        };
        println!("\n  Question {} [{mark}]: {}", r.number, r.question);
        if r.verdict == Verdict::Correct {
            continue;
        }
        match &r.chosen {
            Some(opt) => println!("    Your answer: {}. {}", opt.label, opt.text),
            None => println!("    Your answer: not answered"),
        }
        println!(
            "    Correct answer: {}. {}",
            r.correct_answer,
            r.correct_text.as_deref().unwrap_or("")
        );
        if let Some(explanation) = &r.explanation {
            println!("    Explanation: {explanation}");
        }
    }
}

/// Split a `--format` value into individual formats (`all` expands to every format).
pub fn parse_formats(format: &str) -> Vec<&str> {
    if format == "all" {
        vec!["text", "json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    }
}

/// Emit a report in each of the given formats.
pub fn export(report: &ExamReport, formats: &[&str], output: &Path) -> Result<()> {
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    for fmt in formats {
        match *fmt {
            "text" => print_report(report),
            "markdown" | "md" => println!("{}", report.to_markdown()),
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}
