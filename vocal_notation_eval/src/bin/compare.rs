// Notation comparison CLI, used by the evaluation harness.
//
// Reads a reference and a generated notation file, lays both onto the
// shared step timeline, and prints the comparison report as JSON on stdout.
// Logs go to stderr (filter with RUST_LOG).
//
// Usage:
//   cargo run -p vocal_notation_eval --bin compare -- <input.txt> <output.txt>
//     [--step-ms N] [--include-freestyle] [--config eval.json]

use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vocal_notation::notation::read_notation_file;
use vocal_notation_eval::{EvalError, EvaluationConfig, compare_documents};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let positional: Vec<&str> = args
        .iter()
        .skip(1)
        .enumerate()
        .filter(|(i, a)| !a.starts_with("--") && !is_flag_value(&args[1..], *i))
        .map(|(_, a)| a.as_str())
        .collect();
    let [input, output] = positional[..] else {
        eprintln!(
            "usage: compare <input.txt> <output.txt> [--step-ms N] [--include-freestyle] [--config eval.json]"
        );
        return ExitCode::from(2);
    };

    match run(&args, Path::new(input), Path::new(output)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "comparison failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String], input: &Path, output: &Path) -> Result<String, EvalError> {
    let mut config = match parse_flag::<String>(args, "--config") {
        Some(path) => EvaluationConfig::load(Path::new(&path))?,
        None => EvaluationConfig::default(),
    };
    if let Some(step) = parse_flag(args, "--step-ms") {
        config.step_ms = step;
    }
    if args.iter().any(|a| a == "--include-freestyle") {
        config.include_freestyle = true;
    }

    let reference = read_notation_file(input)?;
    let generated = read_notation_file(output)?;
    let report = compare_documents(&reference, &generated, &config)?;
    serde_json::to_string_pretty(&report).map_err(|source| EvalError::Json {
        context: "serializing comparison report",
        source,
    })
}

/// Flags that take a value; their value is not a positional argument.
fn is_flag_value(args: &[String], index: usize) -> bool {
    index > 0 && matches!(args[index - 1].as_str(), "--step-ms" | "--config")
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
