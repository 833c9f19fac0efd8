use std::{path::PathBuf, process::ExitStatus};

use thiserror::Error;

/// Errors raised while building, loading or calling a native kernel library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("native library not found: {}", .0.display())]
    LibraryNotFound(PathBuf),

    #[error("failed to load native library {}: {source}", .path.display())]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol `{symbol}` not exported by {}: {source}", .path.display())]
    SymbolNotFound {
        symbol: String,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("invalid symbol name {0:?}")]
    InvalidSymbol(String),

    #[error("kernel `{0}` returned a null result pointer")]
    NullResult(String),

    #[error("kernel `{symbol}` returned a misaligned result pointer {address:#x}")]
    MisalignedResult { symbol: String, address: usize },

    #[error("repeat count must be at least 1")]
    InvalidRepeat,

    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("preset {0} not found")]
    PresetNotFound(String),

    #[error("{tool} not found in path: {source}")]
    ToolNotFound {
        tool: &'static str,
        #[source]
        source: which::Error,
    },

    #[error("cmake {step} failed with status: {status}")]
    BuildFailed { step: &'static str, status: ExitStatus },

    #[error("build finished but {} was not produced", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker thread exited without reporting a result")]
    WorkerDisconnected,
}

pub type Result<T> = std::result::Result<T, Error>;
