//! The `examrunner report` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examrunner_core::config::load_config_from;
use examrunner_core::report::ExamReport;
use examrunner_core::store;

use crate::render;

pub fn execute(
    state: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = state.unwrap_or(config.state_path);

    let snapshot = store::load_if_exists(&path)?
        .with_context(|| format!("no saved session at {}", path.display()))?;
    let session = snapshot.to_session()?;
    let report = ExamReport::from_session(&session, snapshot.bank.clone());

    let formats = render::parse_formats(&format);
    let output = output.unwrap_or(config.report_dir);
    if formats.iter().any(|f| matches!(*f, "json" | "html")) {
        std::fs::create_dir_all(&output)
            .with_context(|| format!("failed to create output directory: {}", output.display()))?;
    }
    render::export(&report, &formats, &output)
}
