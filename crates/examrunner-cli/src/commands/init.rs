//! The `examrunner init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("examrunner.toml"), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("programming_questions.json"), SAMPLE_BANK)?;

    println!("\nNext steps:");
    println!("  1. Edit programming_questions.json with your own questions");
    println!("  2. Run: examrunner validate --bank programming_questions.json");
    println!("  3. Run: examrunner take");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examrunner configuration

# Loaded by `examrunner take` when no --bank, --paste or --builtin is given.
bank_path = "programming_questions.json"

# In-progress sessions are saved here after every step.
state_path = ".examrunner/session.json"

shuffle = true
# seed = 42

report_dir = "./examrunner-results"
keep_completed = false
"#;

const SAMPLE_BANK: &str = r#"{
  "title": "Programming Languages Sample",
  "programming_languages_exam_questions": [
    {
      "id": 1,
      "topic": "Rust",
      "question": "Which keyword declares a mutable binding in Rust?",
      "options": {
        "A": "var",
        "B": "let mut",
        "C": "mut let",
        "D": "const"
      },
      "correct_answer": "B",
      "page": 1,
      "explanation": "Bindings are immutable by default; `let mut` makes them mutable."
    },
    {
      "id": 2,
      "topic": "Python",
      "question": "What does `len([1, 2, 3])` return?",
      "options": {
        "A": "2",
        "B": "3",
        "C": "4",
        "D": "An error"
      },
      "correct_answer": "B",
      "page": 2,
      "explanation": "`len` returns the number of items in the list."
    },
    {
      "id": 3,
      "topic": "C",
      "question": "Which header declares `printf`?",
      "options": ["stdlib.h", "stdio.h", "string.h", "math.h"],
      "correct_answer": "B",
      "explanation": "`printf` is declared in <stdio.h>."
    }
  ]
}
"#;
