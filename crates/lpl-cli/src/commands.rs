use anyhow::Context;
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;

use lpl_ledger::{Dispatcher, LedgerConfig, OperationKind, Response};
use lpl_state::{InMemoryWorldState, WorldState};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Ops => cmd_ops(&cli.format),
        Command::Run(args) => cmd_run(args, &cli.format),
    }
}

fn cmd_ops(format: &OutputFormat) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::default();
    let registry = dispatcher.registry();
    if matches!(format, OutputFormat::Json) {
        let specs: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }
    for spec in registry.iter() {
        let kind = match spec.kind {
            OperationKind::Submit => spec.kind.to_string().yellow(),
            OperationKind::Evaluate => spec.kind.to_string().cyan(),
        };
        let params: Vec<String> = spec
            .params
            .iter()
            .map(|p| if p.optional { format!("{}?", p.name) } else { p.name.to_string() })
            .collect();
        println!(
            "{:<36} {:<9} ({}) -> {:?}",
            spec.name.bold(),
            kind,
            params.join(", "),
            spec.returns
        );
        println!("    {}", spec.description.dimmed());
    }
    println!("\n{} operations", registry.len().to_string().bold());
    Ok(())
}

fn cmd_run(args: RunArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => LedgerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;

    let state = match args.timestamp {
        Some(at) => InMemoryWorldState::new().with_fixed_timestamp(at),
        None => InMemoryWorldState::new(),
    };
    let dispatcher = Dispatcher::new(config);
    let responses = execute_script(&dispatcher, &state, &source)?;

    for response in &responses {
        println!("{}", serde_json::to_string(response)?);
    }
    if matches!(format, OutputFormat::Text) {
        let failed = responses.iter().filter(|r| !r.is_success()).count();
        let summary = format!("{} succeeded, {} failed", responses.len() - failed, failed);
        if failed == 0 {
            eprintln!("{} {}", "✓".green().bold(), summary);
        } else {
            eprintln!("{} {}", "✗".red().bold(), summary);
        }
    }
    Ok(())
}

/// One line of an invocation script.
#[derive(Debug, Deserialize)]
struct Step {
    op: String,
    #[serde(default)]
    args: Vec<Value>,
}

/// Run every step of a JSON-lines script in order. Blank lines and lines
/// starting with `#` are skipped. Failed operations produce error responses;
/// only a malformed line aborts the run.
fn execute_script(
    dispatcher: &Dispatcher,
    state: &dyn WorldState,
    source: &str,
) -> anyhow::Result<Vec<Response>> {
    let mut responses = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: Step = serde_json::from_str(line)
            .with_context(|| format!("line {}: not a valid step", index + 1))?;
        // Payload objects may be written inline; operations take them as text.
        let args: Vec<String> = step
            .args
            .into_iter()
            .map(|arg| match arg {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect();
        tracing::debug!(line = index + 1, op = %step.op, "running step");
        responses.push(dispatcher.respond(state, &step.op, &args));
    }
    Ok(responses)
}
