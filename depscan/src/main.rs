use anyhow::{Context, Result};
use clap::Parser;
use depscan_core::{AggregateReport, ProjectScanner, TableRenderer, summary_line};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use depscan::channel::Dispatcher;
use depscan::cli::{Args, Command, ScanArgs};
use depscan::config::Config;
use depscan::logger::init_logger;
use depscan::serve;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose, args.quiet, args.no_color);
    if args.no_color {
        colored::control::set_override(false);
    }

    let project_root = std::path::absolute(args.project_root())
        .with_context(|| format!("Invalid project root: {:?}", args.project_root()))?;

    if !project_root.is_dir() {
        anyhow::bail!("Project root is not a directory: {project_root:?}");
    }

    let config = Config::load(&project_root, args.config.as_deref())?;

    match &args.command {
        Command::Scan(scan) => run_scan(&config, scan, !args.no_color),
        Command::Deps => print_json(&dispatcher(&config, false).dependencies()?),
        Command::Locations => print_json(&dispatcher(&config, false).node_modules_locations()?),
        Command::Serve => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            serve::run(
                dispatcher(&config, config.include_missing),
                input,
                tokio::io::stdout(),
            )
            .await
        }
    }
}

fn dispatcher(config: &Config, include_missing: bool) -> Dispatcher {
    Dispatcher::new(
        config.projects.clone(),
        ProjectScanner::new().include_missing(include_missing),
    )
}

fn run_scan(config: &Config, args: &ScanArgs, colors: bool) -> Result<()> {
    let scanner = ProjectScanner::new().include_missing(args.include_missing || config.include_missing);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message("Scanning dependencies...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let report = AggregateReport::generate(&scanner, &config.projects);
    spinner.finish_and_clear();

    if args.stdout {
        println!("{}", report.to_json_pretty()?);
        return Ok(());
    }

    let output = args.output.as_ref().unwrap_or(&config.output);
    report.write_to(output)?;

    TableRenderer::new(colors).render(&report);
    println!("{}", summary_line(&report));
    println!("Report saved to {}", output.display());

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
