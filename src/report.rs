use std::io::Write;

use clap::ValueEnum;

use crate::invoke::Outcome;

/// How invocation results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `sum` and `time` lines per call (default)
    #[default]
    Text,
    /// One JSON array of all calls
    Json,
}

pub fn write_report<W: Write>(
    out: &mut W,
    outcomes: &[Outcome],
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Text => {
            for outcome in outcomes {
                writeln!(out)?;
                writeln!(out, "{}", outcome.result)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, outcomes)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
