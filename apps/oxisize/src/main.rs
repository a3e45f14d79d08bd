use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use oxisize_report::{Config, RunSummary};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxisize")]
#[command(about = "Size reports for the exports of JavaScript/TypeScript packages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Estimate the bundle bytes and dependencies of every exported symbol
    ExportSize(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::ExportSize(cfg) => {
            info!(
                "Running export size analysis (output={:?}, ci={}, bundle field={})",
                cfg.output, cfg.ci, cfg.bundle_field
            );

            let summary = oxisize_report::run_export_size(cfg)?;
            let elapsed_ms = start.elapsed().as_millis();

            print_summary(&mut stdout, &summary)?;
            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} modules.",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                summary.modules.len().to_string().cyan()
            )?;
            stdout.flush()?;

            Ok(())
        }
    }
}

fn print_summary<W: Write>(out: &mut W, summary: &RunSummary) -> Result<()> {
    if summary.modules.is_empty() {
        writeln!(out, "{} No modules with type declarations were found.", "!".yellow())?;
        return Ok(());
    }

    for module in &summary.modules {
        writeln!(
            out,
            "{} {} {} ({} exports)",
            "✓".green(),
            module.name.bold(),
            module.artifact.dimmed(),
            module.symbols.to_string().cyan()
        )?;
    }
    Ok(())
}
