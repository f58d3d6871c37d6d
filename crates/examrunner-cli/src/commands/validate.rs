//! The `examrunner validate` command.

use std::path::PathBuf;

use anyhow::Result;

use examrunner_core::parser::{self, Severity};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let bank = parser::parse_bank(&bank_path)?;

    let key = bank.key.as_deref().unwrap_or("(top-level array)");
    println!(
        "Question bank: {} ({} questions, key: {key})",
        bank.display_title(),
        bank.questions.len()
    );

    let findings = parser::validate_bank(&bank);
    for f in &findings {
        let prefix = f
            .question
            .as_ref()
            .map(|q| format!("  [{q}]"))
            .unwrap_or_else(|| "  ".to_string());
        let label = match f.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };
        println!("{prefix} {label}: {}", f.message);
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("{errors} error(s) found in {}", bank_path.display());
    }

    if findings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", findings.len());
    }

    Ok(())
}
