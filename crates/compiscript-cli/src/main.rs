mod report;

#[cfg(test)]
mod report_tests;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use compiscript_compiler::{analyze, lower_program};
use compiscript_tac::program_to_string;

use report::Report;

/// Compiscript semantic analyzer and TAC generator.
#[derive(Debug, Parser)]
#[command(name = "compiscript", version)]
struct Cli {
    /// Source file to analyze (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Emit a JSON report for editor tooling
    #[arg(long)]
    json: bool,

    /// Include the symbol tables in the output
    #[arg(long)]
    symbols: bool,

    /// Generate the TAC listing when analysis succeeds
    #[arg(long = "emit-ir")]
    emit_ir: bool,

    /// Colorize human-readable diagnostics
    #[arg(long)]
    color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = match read_source(cli.file.as_deref()) {
        Ok(source) => source,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(2);
        }
    };

    // Syntax errors are hard failures, outside the diagnostic report.
    let analysis = match analyze(&source) {
        Ok(analysis) => analysis,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::from(2);
        }
    };

    if cli.json {
        let mut report = Report::build(&analysis, cli.symbols);
        if cli.emit_ir && report.ok {
            match lower_program(&analysis.ast) {
                Ok(lowered) => report.ir = Some(program_to_string(&lowered.program)),
                Err(error) => report.record_irgen_failure(&error),
            }
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("report always serializes")
        );
        return if report.ok {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    if analysis.diagnostics.has_errors() {
        let path = cli.file.as_deref().map(|p| p.display().to_string());
        let mut printer = analysis
            .diagnostics
            .printer()
            .source(&source)
            .colored(cli.color);
        if let Some(path) = path.as_deref() {
            printer = printer.path(path);
        }
        eprintln!("{}", printer.render());
        return ExitCode::FAILURE;
    }

    println!("OK (no errors)");
    if cli.symbols {
        let symbols = report::symbols(&analysis.tables);
        println!(
            "{}",
            serde_json::to_string_pretty(&symbols).expect("symbols always serialize")
        );
    }
    if cli.emit_ir {
        match lower_program(&analysis.ast) {
            Ok(lowered) => {
                println!();
                println!("--- IR (TAC) ---");
                println!("{}", program_to_string(&lowered.program));
            }
            Err(error) => {
                eprintln!("error: E_IRGEN: {error}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn read_source(file: Option<&Path>) -> Result<String, String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display())),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| format!("cannot read stdin: {e}"))?;
            Ok(source)
        }
    }
}
