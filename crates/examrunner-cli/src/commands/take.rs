//! The `examrunner take` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examrunner_core::config::load_config_from;
use examrunner_core::engine::{make_rng, EngineConfig, EngineOutcome, ExamEngine};
use examrunner_core::model::{BankSource, QuestionBank};
use examrunner_core::parser::{self, Severity};
use examrunner_core::session::ExamSession;
use examrunner_core::{builtin, store};

use crate::console::{read_pasted_json, ConsoleObserver, ConsoleSource};
use crate::render;

pub struct TakeArgs {
    pub bank: Option<PathBuf>,
    pub paste: bool,
    pub builtin: bool,
    pub state: Option<PathBuf>,
    pub fresh: bool,
    pub seed: Option<u64>,
    pub no_shuffle: bool,
    pub format: String,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl TakeArgs {
    fn explicit_source(&self) -> bool {
        self.bank.is_some() || self.paste || self.builtin
    }
}

pub fn execute(args: TakeArgs) -> Result<()> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(state) = &args.state {
        config.state_path = state.clone();
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.no_shuffle {
        config.shuffle = false;
    }

    tracing::debug!(
        "state file {}, shuffle {}, seed {:?}",
        config.state_path.display(),
        config.shuffle,
        config.seed
    );

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut rng = make_rng(config.seed);
    let engine_config = EngineConfig::from(&config);

    let saved = if args.explicit_source() || args.fresh {
        None
    } else {
        store::load_if_exists(&config.state_path)
            .with_context(|| format!("cannot resume {}", config.state_path.display()))?
    };

    let mut engine = match saved {
        Some(snapshot) if !snapshot.completed => {
            println!(
                "Resuming \"{}\" ({} of {} answered). Use --fresh to start over.",
                snapshot.bank.title,
                snapshot.answers.iter().filter(|a| a.is_some()).count(),
                snapshot.questions.len()
            );
            ExamEngine::resume(snapshot, rng, engine_config)?
        }
        _ => {
            let bank = load_bank(&args, &config, &mut input)?;
            check_bank(&bank)?;
            println!(
                "Loaded {} questions from {}",
                bank.questions.len(),
                bank.source
            );
            println!("Exam: {}", bank.display_title());
            println!("Type `help` for commands.");

            let summary = bank.summary();
            let session = ExamSession::new(bank.questions, config.shuffle, &mut rng)?;
            ExamEngine::new(session, summary, rng, engine_config)
        }
    };

    let mut source = ConsoleSource::new(input);
    match engine.run(&mut source, &ConsoleObserver)? {
        EngineOutcome::Completed(report) => {
            let output = args.output.unwrap_or_else(|| config.report_dir.clone());
            let formats: Vec<&str> = render::parse_formats(&args.format)
                .into_iter()
                .filter(|f| *f != "text")
                .collect();
            if formats.iter().any(|f| matches!(*f, "json" | "html")) {
                std::fs::create_dir_all(&output).with_context(|| {
                    format!("failed to create output directory: {}", output.display())
                })?;
            }
            render::export(&report, &formats, &output)?;
        }
        EngineOutcome::Suspended => {
            println!(
                "Progress saved to {}. Run `examrunner take` to continue.",
                config.state_path.display()
            );
        }
    }

    Ok(())
}

fn load_bank(
    args: &TakeArgs,
    config: &examrunner_core::config::ExamConfig,
    input: &mut impl std::io::BufRead,
) -> Result<QuestionBank> {
    let bank = if let Some(path) = &args.bank {
        parser::parse_bank(path)?
    } else if args.paste {
        let json = read_pasted_json(input)?;
        parser::parse_bank_str(&json, BankSource::Stdin).context("invalid pasted JSON")?
    } else if args.builtin {
        builtin::builtin_bank()?
    } else {
        parser::load_default_bank(config)?
    };
    Ok(bank)
}

fn check_bank(bank: &QuestionBank) -> Result<()> {
    let findings = parser::validate_bank(bank);
    for f in &findings {
        let label = match f.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };
        let prefix = f.question.as_deref().unwrap_or("bank");
        eprintln!("[{prefix}] {label}: {}", f.message);
    }
    if parser::has_errors(&findings) {
        anyhow::bail!(
            "question bank has errors; run `examrunner validate --bank <file>` for details"
        );
    }
    Ok(())
}
