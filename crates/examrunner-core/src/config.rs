//! Runner configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level examrunner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Local bank loaded when no other source is given.
    #[serde(default = "default_bank_path")]
    pub bank_path: PathBuf,
    /// Where an in-progress session is saved.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    /// Shuffle questions when a session starts.
    #[serde(default = "default_true")]
    pub shuffle: bool,
    /// Fixed RNG seed for reproducible question order.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Output directory for exported reports.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Keep the session file after the exam is finished.
    #[serde(default)]
    pub keep_completed: bool,
}

fn default_bank_path() -> PathBuf {
    PathBuf::from("programming_questions.json")
}
fn default_state_path() -> PathBuf {
    PathBuf::from(".examrunner").join("session.json")
}
fn default_true() -> bool {
    true
}
fn default_report_dir() -> PathBuf {
    PathBuf::from("./examrunner-results")
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            bank_path: default_bank_path(),
            state_path: default_state_path(),
            shuffle: true,
            seed: None,
            report_dir: default_report_dir(),
            keep_completed: false,
        }
    }
}

/// Expand `${VAR}` references in a config path. Unset variables expand to
/// nothing; substituted text is not expanded again.
fn expand_vars(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &rest[start + 2..start + 2 + len];
        out.push_str(&lookup(name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(expand_vars(&path.to_string_lossy(), |name| {
        std::env::var(name).ok()
    }))
}

/// Apply `EXAMRUNNER_*` overrides using the given variable lookup.
fn apply_env_overrides(
    config: &mut ExamConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(bank) = lookup("EXAMRUNNER_BANK") {
        config.bank_path = PathBuf::from(bank);
    }
    if let Some(state) = lookup("EXAMRUNNER_STATE") {
        config.state_path = PathBuf::from(state);
    }
    if let Some(seed) = lookup("EXAMRUNNER_SEED") {
        let seed = seed
            .trim()
            .parse()
            .with_context(|| format!("EXAMRUNNER_SEED is not a number: '{seed}'"))?;
        config.seed = Some(seed);
    }
    Ok(())
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examrunner.toml` in the current directory
/// 2. `~/.config/examrunner/config.toml`
///
/// Environment variable overrides: `EXAMRUNNER_BANK`, `EXAMRUNNER_STATE`,
/// `EXAMRUNNER_SEED`.
pub fn load_config() -> Result<ExamConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examrunner.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    config.bank_path = resolve_path(&config.bank_path);
    config.state_path = resolve_path(&config.state_path);
    config.report_dir = resolve_path(&config.report_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examrunner"))
}
