use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use kernlib::{
    cli::{BuildArgs, Cli, Command, RunArgs},
    report, symbol, Input, LaunchConfig, ResultOwnership, SymbolName,
};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(io::stderr)
            .init();
    } else if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();
    }
}

fn run(config: LaunchConfig, args: RunArgs) -> Result<()> {
    let mut invocation = config.invocation();

    if let Some(library) = args.library {
        invocation = invocation.set_library_path(library);
    }
    if let Some(symbol) = args.symbol {
        invocation = invocation.set_symbol(SymbolName::new(symbol)?);
    }
    if let Some(free_symbol) = args.caller_frees {
        invocation = invocation.set_ownership(ResultOwnership::CallerFrees {
            free_symbol: SymbolName::new(free_symbol)?,
        });
    }
    if let Some(value) = args.input {
        invocation = invocation.set_input(Input::Fixed(value));
    }
    if let Some(repeat) = args.repeat {
        invocation = invocation.set_repeat(repeat);
    }

    let outcomes = invocation.run().context("kernel invocation failed")?;

    let mut stdout = io::stdout().lock();
    report::write_report(&mut stdout, &outcomes, args.format)?;
    stdout.flush()?;
    Ok(())
}

fn build(config: LaunchConfig, args: BuildArgs) -> Result<()> {
    let mut build = config.build.unwrap_or_default();

    if let Some(source) = args.source {
        build.source = source;
    }
    if args.preset.is_some() {
        build.preset = args.preset;
    }
    if args.binary_dir.is_some() {
        build.binary_dir = args.binary_dir;
    }
    if let Some(output_dir) = args.output_dir {
        build.output_dir = output_dir;
    }
    if let Some(build_config) = args.build_config {
        build.config = build_config;
    }
    build.defines.extend(args.defines);

    let artifact = build
        .native_build()
        .build()
        .with_context(|| format!("failed to build native library from {}", build.source.display()))?;

    println!("{}", artifact.display());
    Ok(())
}

fn symbols(config: &LaunchConfig) {
    let configured = &config.symbol;
    for name in [symbol::MSVC_VECTOR_ADD, symbol::VECTOR_ADD] {
        let Ok(symbol) = SymbolName::new(name) else {
            continue;
        };
        let marker = if &symbol == configured { "*" } else { " " };
        let kind = if symbol.is_mangled() { "mangled" } else { "c-linkage" };
        println!("{marker} {kind:<9} {symbol}");
    }

    if ![symbol::MSVC_VECTOR_ADD, symbol::VECTOR_ADD].contains(&configured.as_str()) {
        let kind = if configured.is_mangled() { "mangled" } else { "c-linkage" };
        println!("* {kind:<9} {configured}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = LaunchConfig::load(cli.config.as_deref()).context("failed to load launch config")?;

    match cli.command.unwrap_or_default() {
        Command::Run(args) => run(config, args),
        Command::Build(args) => build(config, args),
        Command::Symbols => {
            symbols(&config);
            Ok(())
        }
    }
}
