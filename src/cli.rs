//! CLI argument parsing for kernlib

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "kernlib")]
#[command(version)]
#[command(about = "Load a native kernel library and call its vector-add entry point", long_about = None)]
pub struct Cli {
    /// Launch config file (defaults to ./kernlib.json when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Runs the kernel when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the library, call the kernel and print sum and time
    Run(RunArgs),
    /// Configure and build the native library with CMake
    Build(BuildArgs),
    /// List the known entry point names
    Symbols,
}

impl Default for Command {
    fn default() -> Self {
        Command::Run(RunArgs::default())
    }
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path of the native library
    #[arg(short, long, value_name = "PATH")]
    pub library: Option<PathBuf>,

    /// Exported symbol to call, matched exactly
    #[arg(short, long, value_name = "NAME")]
    pub symbol: Option<String>,

    /// Fixed kernel input (a random value in [0, 1) when omitted)
    #[arg(short, long, value_name = "X", allow_negative_numbers = true)]
    pub input: Option<f64>,

    /// Number of calls through the same library handle
    #[arg(short = 'n', long, value_name = "N")]
    pub repeat: Option<usize>,

    /// Results are heap records released through this exported function
    #[arg(long = "caller-frees", value_name = "FREE_SYMBOL")]
    pub caller_frees: Option<String>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// CMake source directory
    #[arg(short = 'S', long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Configure preset from CMakePresets.json
    #[arg(short, long, value_name = "NAME")]
    pub preset: Option<String>,

    /// CMake binary (cache) directory
    #[arg(short = 'B', long = "binary-dir", value_name = "DIR")]
    pub binary_dir: Option<PathBuf>,

    /// Directory the library is written to
    #[arg(short, long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Build configuration (Debug, Release, ...)
    #[arg(long = "build-config", value_name = "CONFIG")]
    pub build_config: Option<String>,

    /// Extra cache entries, e.g. -D CMAKE_CUDA_ARCHITECTURES=75
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,
}

fn parse_define(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}
