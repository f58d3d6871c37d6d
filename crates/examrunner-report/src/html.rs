//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use examrunner_core::report::{ExamReport, TopicStats, Verdict};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn verdict_class(verdict: Verdict) -> (&'static str, &'static str) {
    match verdict {
        Verdict::Correct => ("pass", "Correct"),
        Verdict::Incorrect => ("fail", "Incorrect"),
        Verdict::Unanswered => ("skip", "Not answered"),
    }
}

/// Generate an HTML report from an exam report.
pub fn generate_html(report: &ExamReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>examrunner report: {}</title>\n",
        html_escape(&report.bank.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.bank.title)));
    html.push_str(&format!(
        "<p class=\"meta\">Source: <strong>{}</strong> | {} questions | {} topics | {}{}</p>\n",
        html_escape(&report.bank.source.to_string()),
        report.total,
        report.per_topic.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        if report.completed { "" } else { " | in progress" }
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Questions</th><th>Answered</th><th>Correct</th><th>Score</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr></tbody></table>\n",
        report.total, report.answered, report.correct, report.percentage
    ));
    html.push_str(&format!(
        "<p class=\"band\">{}</p>\n",
        html_escape(report.band.headline())
    ));

    // SVG bar chart per topic
    if !report.per_topic.is_empty() {
        html.push_str("<h2>Topics</h2>\n");
        html.push_str(&generate_bar_chart(&report.per_topic));
    }

    html.push_str("</section>\n");

    // Per-question results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Answers</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Topic</th><th onclick=\"sortTable(2)\">Your answer</th><th onclick=\"sortTable(3)\">Correct</th><th onclick=\"sortTable(4)\">Result</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for r in &report.reviews {
        let (class, text) = verdict_class(r.verdict);
        let chosen = r
            .chosen
            .as_ref()
            .map(|o| o.label.as_str())
            .unwrap_or("-");
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            class,
            r.number,
            html_escape(&r.topic),
            html_escape(chosen),
            html_escape(&r.correct_answer),
            class,
            text
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Detailed review
    html.push_str("<section class=\"review\">\n");
    html.push_str("<h2>Detailed review</h2>\n");
    for r in &report.reviews {
        let (class, text) = verdict_class(r.verdict);
        html.push_str(&format!(
            "<details class=\"{}\">\n<summary>Question {}: {} ({})</summary>\n",
            class,
            r.number,
            html_escape(&r.question),
            text
        ));
        html.push_str(&format!("<p><strong>Topic:</strong> {}", html_escape(&r.topic)));
        if let Some(page) = r.page {
            html.push_str(&format!(" | <strong>Reference:</strong> page {page}"));
        }
        html.push_str("</p>\n");
        let chosen = match &r.chosen {
            Some(o) => format!("{}. {}", html_escape(&o.label), html_escape(&o.text)),
            None => "Not answered".to_string(),
        };
        html.push_str(&format!("<p><strong>Your answer:</strong> {chosen}</p>\n"));
        html.push_str(&format!(
            "<p><strong>Correct answer:</strong> {}. {}</p>\n",
            html_escape(&r.correct_answer),
            html_escape(r.correct_text.as_deref().unwrap_or(""))
        ));
        if let Some(explanation) = &r.explanation {
            html.push_str(&format!(
                "<blockquote>{}</blockquote>\n",
                html_escape(explanation)
            ));
        }
        html.push_str("</details>\n");
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ExamReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(topics: &[TopicStats]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 280;

    let total_height = topics.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, topic) in topics.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let score = topic.percentage / 100.0;
        let width = (score * max_width as f64) as usize;

        let color = if score >= 0.8 {
            "#22c55e"
        } else if score >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"13\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&topic.topic)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}/{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            topic.correct,
            topic.total
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --skip: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --skip: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.skip { background: var(--skip); }
.band { font-size: 1.25rem; font-weight: bold; }
blockquote { border-left: 4px solid var(--border); margin: 0.5rem 0; padding: 0.25rem 1rem; }
details.pass, details.fail, details.skip { padding: 0.25rem 1rem; border-radius: 6px; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const cmp = va.localeCompare(vb, undefined, { numeric: true });
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
