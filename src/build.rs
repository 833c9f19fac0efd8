use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::mpsc::{self, Receiver},
    thread,
};

use tracing::{debug, info};

use crate::{
    cmake::CMakePresets,
    error::{Error, Result},
    library::{self, LIBRARY_NAME},
};

/// Configures and builds the CMake project that produces the native kernel
/// library, then finds the library it produced.
pub struct NativeBuild {
    args: Vec<String>,
    source_path: PathBuf,
    binary_path: Option<PathBuf>,
    output_path: PathBuf,
    preset: Option<String>,
    defines: Vec<String>,
    config: String,
    library_name: String,
}

impl NativeBuild {
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            source_path: PathBuf::from("native"),
            binary_path: None,
            output_path: PathBuf::from("build"),
            preset: None,
            defines: Vec::new(),
            config: String::from("Debug"),
            library_name: String::from(LIBRARY_NAME),
        }
    }

    pub fn add_arg<T>(mut self, arg: T) -> Self
    where
        T: Into<String>,
    {
        self.args.push(arg.into());
        self
    }

    pub fn set_source_path<T>(mut self, path: T) -> Self
    where
        T: Into<PathBuf>,
    {
        self.source_path = path.into();
        self
    }

    pub fn set_binary_path<T>(mut self, path: T) -> Self
    where
        T: Into<PathBuf>,
    {
        self.binary_path = Some(path.into());
        self
    }

    pub fn set_output_path<T>(mut self, path: T) -> Self
    where
        T: Into<PathBuf>,
    {
        self.output_path = path.into();
        self
    }

    pub fn set_preset<T>(mut self, preset: T) -> Self
    where
        T: Into<String>,
    {
        self.preset = Some(preset.into());
        self
    }

    pub fn add_define<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.defines
            .push(format!("-D{}={}", key.as_ref(), value.as_ref()));
        self
    }

    /// Build configuration, `Debug` unless set.
    pub fn set_config<T>(mut self, config: T) -> Self
    where
        T: Into<String>,
    {
        self.config = config.into();
        self
    }

    pub fn set_library_name<T>(mut self, name: T) -> Self
    where
        T: Into<String>,
    {
        self.library_name = name.into();
        self
    }

    /// Runs the build and returns the path of the produced library.
    pub fn build(&self) -> Result<PathBuf> {
        self.execute()
    }

    pub fn spawn(self) -> Receiver<Result<PathBuf>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(self.execute());
        });

        rx
    }

    /// Where the library is expected after a build: `<output>/<config>/`
    /// first, then the output directory itself for projects that set their
    /// own output paths.
    pub fn artifact_candidates(&self) -> [PathBuf; 2] {
        let file = library::library_file_name(&self.library_name);
        [
            self.output_path.join(&self.config).join(&file),
            self.output_path.join(&file),
        ]
    }

    fn execute(&self) -> Result<PathBuf> {
        let cmake = which::which("cmake").map_err(|source| Error::ToolNotFound {
            tool: "cmake",
            source,
        })?;

        let mut preset_arg = None;
        let mut binary_path = self.binary_path.clone();
        if let Some(preset_name) = &self.preset {
            let presets = CMakePresets::new(&self.source_path)?;
            let preset = presets
                .get_preset(preset_name)
                .ok_or_else(|| Error::PresetNotFound(preset_name.clone()))?;

            preset_arg = Some(format!("--preset={}", preset.get_name()));
            if binary_path.is_none() {
                binary_path = presets.binary_dir(preset_name, &self.source_path);
            }
        }
        let binary_path = binary_path.unwrap_or_else(|| PathBuf::from("build"));

        create_dir_if_missing(&binary_path)?;
        create_dir_if_missing(&self.output_path)?;
        let output_path = self.output_path.canonicalize()?;

        let output_path_args = [
            "CMAKE_RUNTIME_OUTPUT_DIRECTORY",
            "CMAKE_LIBRARY_OUTPUT_DIRECTORY",
            "CMAKE_ARCHIVE_OUTPUT_DIRECTORY",
        ]
        // `$<CONFIG>` keeps `<output>/<config>/` on single-config generators
        // too, and stops multi-config ones from appending their own subdir
        .map(|var| format!("-D{}={}/$<CONFIG>", var, output_path.display()));

        info!(
            source = %self.source_path.display(),
            binary = %binary_path.display(),
            config = %self.config,
            "configuring native library"
        );
        let mut configure = Command::new(&cmake);
        configure
            .arg("-S")
            .arg(&self.source_path)
            .arg("-B")
            .arg(&binary_path)
            .args(preset_arg)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", self.config))
            .args(&self.defines)
            .args(output_path_args)
            .args(&self.args);
        debug!(command = ?configure, "running cmake");

        let status = configure.status()?;
        if !status.success() {
            return Err(Error::BuildFailed {
                step: "configure",
                status,
            });
        }

        info!(config = %self.config, "building native library");
        let status = Command::new(&cmake)
            .arg("--build")
            .arg(&binary_path)
            .args(["--config", self.config.as_str()])
            .status()?;
        if !status.success() {
            return Err(Error::BuildFailed {
                step: "build",
                status,
            });
        }

        let candidates = self.artifact_candidates();
        let artifact = candidates
            .iter()
            .find(|candidate| candidate.exists())
            .cloned()
            .ok_or_else(|| Error::ArtifactNotFound(candidates[0].clone()))?;

        info!(artifact = %artifact.display(), "native library built");
        Ok(artifact)
    }
}

impl Default for NativeBuild {
    fn default() -> Self {
        Self::new()
    }
}

fn create_dir_if_missing(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
