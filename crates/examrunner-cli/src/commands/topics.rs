//! The `examrunner topics` command.

use std::path::PathBuf;

use anyhow::Result;

use examrunner_core::config::load_config_from;
use examrunner_core::parser;

use crate::render;

pub fn execute(bank_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let bank = match bank_path {
        Some(path) => parser::parse_bank(&path)?,
        None => parser::load_default_bank(&load_config_from(config_path.as_deref())?)?,
    };

    println!(
        "{}: {} questions from {}",
        bank.display_title(),
        bank.questions.len(),
        bank.source
    );
    render::print_topics(&bank.topics());
    Ok(())
}
