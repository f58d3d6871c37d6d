//! The `examrunner status` command.

use std::path::PathBuf;

use anyhow::Result;

use examrunner_core::config::load_config_from;
use examrunner_core::store;

use crate::render;

pub fn execute(state: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = state.unwrap_or(config.state_path);

    let Some(snapshot) = store::load_if_exists(&path)? else {
        println!("No saved session at {}", path.display());
        return Ok(());
    };
    let session = snapshot.to_session()?;

    println!("Exam: {}", snapshot.bank.title);
    println!("Source: {}", snapshot.bank.source);
    println!(
        "Started: {}  Last saved: {}",
        snapshot.created_at.format("%Y-%m-%d %H:%M"),
        snapshot.updated_at.format("%Y-%m-%d %H:%M")
    );
    if session.is_completed() {
        println!("Status: completed");
    } else {
        println!(
            "Status: in progress, at question {}/{}",
            session.position() + 1,
            session.total()
        );
    }

    render::print_progress(&session.progress());
    render::print_topics(session.topics());
    Ok(())
}
