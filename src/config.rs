use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    build::NativeBuild,
    error::{Error, Result},
    invoke::Invocation,
    library::{self, ResultOwnership},
    symbol::SymbolName,
};

/// File read from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "kernlib.json";

/// How to find, bind and (optionally) build the native kernel library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    pub library: PathBuf,
    pub symbol: SymbolName,
    pub ownership: ResultOwnership,
    pub build: Option<BuildConfig>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            library: library::default_library_path(),
            symbol: SymbolName::default(),
            ownership: ResultOwnership::Static,
            build: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub source: PathBuf,
    pub preset: Option<String>,
    pub binary_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub config: String,
    pub defines: Vec<(String, String)>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("native"),
            preset: None,
            binary_dir: None,
            output_dir: PathBuf::from("build"),
            config: String::from("Debug"),
            defines: Vec::new(),
        }
    }
}

impl LaunchConfig {
    /// Reads `path`. The file must exist.
    pub fn from_file<T>(path: T) -> Result<Self>
    where
        T: AsRef<Path>,
    {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "loaded launch config");
        Ok(config)
    }

    /// Reads `path` if given, otherwise [`DEFAULT_CONFIG_FILE`] when present,
    /// otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn invocation(&self) -> Invocation {
        Invocation::new()
            .set_library_path(&self.library)
            .set_symbol(self.symbol.clone())
            .set_ownership(self.ownership.clone())
    }
}

impl BuildConfig {
    pub fn native_build(&self) -> NativeBuild {
        let mut build = NativeBuild::new()
            .set_source_path(&self.source)
            .set_output_path(&self.output_dir)
            .set_config(&self.config);

        if let Some(preset) = &self.preset {
            build = build.set_preset(preset);
        }
        if let Some(binary_dir) = &self.binary_dir {
            build = build.set_binary_path(binary_dir);
        }
        for (key, value) in &self.defines {
            build = build.add_define(key, value);
        }
        build
    }
}
