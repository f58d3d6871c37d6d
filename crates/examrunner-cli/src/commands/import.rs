//! The `examrunner import` command.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use examrunner_core::config::load_config_from;
use examrunner_core::model::BankSource;
use examrunner_core::parser;

pub fn execute(
    bank_path: PathBuf,
    dest: Option<PathBuf>,
    force: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dest = dest.unwrap_or(config.bank_path);

    let content = std::fs::read_to_string(&bank_path)
        .with_context(|| format!("failed to read question bank {}", bank_path.display()))?;
    let bank = parser::parse_bank_str(&content, BankSource::File(bank_path.clone()))?;
    if parser::has_errors(&parser::validate_bank(&bank)) {
        anyhow::bail!(
            "{} has errors; run `examrunner validate --bank {}` for details",
            bank_path.display(),
            bank_path.display()
        );
    }

    if same_file(&bank_path, &dest) {
        println!(
            "{} is already the local question bank ({} questions); nothing to import.",
            dest.display(),
            bank.questions.len()
        );
        return Ok(());
    }

    if dest.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            dest.display()
        );
    }
    write_atomic(&dest, content.as_bytes())?;

    println!(
        "Imported {} questions into {}",
        bank.questions.len(),
        dest.display()
    );
    println!("It will be loaded automatically by `examrunner take`.");
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Write through a temp file in the destination directory, then rename.
fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)?;
    tmp.persist(dest)
        .with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
}
