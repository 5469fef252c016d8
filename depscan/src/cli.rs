use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Report which declared npm dependencies are actually installed
#[derive(Parser, Debug, Clone)]
#[command(name = "depscan")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Component sandbox root; the default projects are resolved from here
    #[arg(long, value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Config file (defaults to <ROOT>/depscan.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan every project and write the dependency report
    Scan(ScanArgs),
    /// Print the declared dependencies of every project
    Deps,
    /// Print the node_modules location of every project
    Locations,
    /// Answer JSON requests on stdin, one per line, until EOF
    Serve,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// Report file (overrides the configured output)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the report to stdout instead of writing it
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// List declared packages that are not installed
    #[arg(long)]
    pub include_missing: bool,
}

impl Args {
    pub fn project_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
