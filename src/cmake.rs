use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Inherits {
    One(String),
    Many(Vec<String>),
}

impl Inherits {
    fn names(&self) -> &[String] {
        match self {
            Inherits::One(name) => std::slice::from_ref(name),
            Inherits::Many(names) => names,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CMakePreset {
    name: String,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    binary_dir: Option<String>,
    #[serde(default)]
    inherits: Option<Inherits>,
}

impl CMakePreset {
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CMakePresets {
    #[serde(default)]
    configure_presets: Vec<CMakePreset>,
}

impl CMakePresets {
    pub fn new<T>(path: T) -> Result<Self>
    where
        T: Into<PathBuf>,
    {
        let path = path.into();

        let path = if path.ends_with("CMakePresets.json") {
            path
        } else {
            path.join("CMakePresets.json")
        };

        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| Error::Config { path, source })
    }

    /// Looks up a preset that can be passed to `cmake --preset`.
    pub fn get_preset(&self, name: &str) -> Option<&CMakePreset> {
        self.find(name).filter(|p| !p.hidden)
    }

    /// Binary directory `name` configures into, following `inherits`.
    /// `${sourceDir}` and `${presetName}` are expanded; other macros are left
    /// as-is.
    pub fn binary_dir(&self, name: &str, source_dir: &Path) -> Option<PathBuf> {
        let raw = self.inherited_binary_dir(name, &mut Vec::new())?;
        let expanded = raw
            .replace("${sourceDir}", &source_dir.to_string_lossy())
            .replace("${presetName}", name);

        let dir = PathBuf::from(expanded);
        Some(if dir.is_relative() { source_dir.join(dir) } else { dir })
    }

    fn find(&self, name: &str) -> Option<&CMakePreset> {
        self.configure_presets.iter().find(|p| p.name == name)
    }

    fn inherited_binary_dir<'a>(&'a self, name: &'a str, seen: &mut Vec<&'a str>) -> Option<&'a str> {
        if seen.contains(&name) {
            return None;
        }
        seen.push(name);

        let preset = self.find(name)?;
        if let Some(dir) = &preset.binary_dir {
            return Some(dir.as_str());
        }

        preset
            .inherits
            .iter()
            .flat_map(Inherits::names)
            .find_map(|parent| self.inherited_binary_dir(parent, seen))
    }
}
