use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::error::PreferenceError;

pub const THEME_KEY: &str = "theme";

/// Key/value string storage that outlives a session.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object of strings on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(PreferenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| PreferenceError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        let io_err = |source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let encoded = serde_json::to_string_pretty(&values).map_err(|source| PreferenceError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, encoded).map_err(io_err)?;
        debug!(key, path = %self.path.display(), "preference saved");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme `{other}`")),
        }
    }
}

/// Stored theme, or `system_default` when nothing usable is stored.
pub fn load_theme(
    store: &dyn PreferenceStore,
    system_default: Theme,
) -> Result<Theme, PreferenceError> {
    Ok(store
        .get(THEME_KEY)?
        .and_then(|value| value.parse().ok())
        .unwrap_or(system_default))
}

pub fn save_theme(store: &mut dyn PreferenceStore, theme: Theme) -> Result<(), PreferenceError> {
    store.set(THEME_KEY, theme.as_str())
}

pub fn toggle_theme(
    store: &mut dyn PreferenceStore,
    system_default: Theme,
) -> Result<Theme, PreferenceError> {
    let next = load_theme(store, system_default)?.toggled();
    save_theme(store, next)?;
    Ok(next)
}
