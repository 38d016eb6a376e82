use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Key holding the application working directory (string).
pub const WORK_DIRECTORY: &str = "work_directory";
/// Key holding the known blender executables (map path -> version line).
pub const BIN_PATHS: &str = "bin_paths";
/// Key holding the currently selected blender executable (string).
pub const CURRENT_BIN: &str = "current_bin";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Config file does not contain a JSON object")]
    NotAnObject,
    #[error("Unable to resolve the platform config directory")]
    NoConfigDir,
}

/// Flat key-value store persisted as a single JSON object.
///
/// The backing file is read once at construction and rewritten in full on
/// every `set_variable`. There is no file locking and no atomic rename; the
/// application is single-instance and writes are rare, so last-writer-wins
/// is accepted. External edits to the file are invisible until a new `load`.
#[derive(Debug)]
pub struct ConfigManager {
    file_path: PathBuf,
    variables: Map<String, Value>,
}

impl ConfigManager {
    /// Read the store from `path`. A missing file yields an empty store; a
    /// file whose payload is not a JSON object is a hard error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let file_path = path.into();
        let variables = if file_path.exists() {
            let data = fs::read_to_string(&file_path)?;
            match serde_json::from_str(&data)? {
                Value::Object(map) => map,
                _ => return Err(ConfigError::NotAnObject),
            }
        } else {
            Map::new()
        };

        Ok(Self {
            file_path,
            variables,
        })
    }

    /// Platform-specific default location for the config file. Creates the
    /// parent directory if needed.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("blendqueue");
        fs::create_dir_all(&dir)?;
        Ok(dir.join("config.json"))
    }

    /// Update a key and synchronously flush the whole store to disk.
    pub fn set_variable(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ConfigError> {
        let key = key.into();
        let value = value.into();
        log::debug!("config: set {} = {}", key, value);
        self.variables.insert(key, value);
        self.save()
    }

    pub fn get_variable(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Convenience accessor for string-valued keys.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.variables.get(key).and_then(Value::as_str)
    }

    pub fn has_variable(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }

    fn save(&self) -> Result<(), ConfigError> {
        let data = serde_json::to_string_pretty(&Value::Object(self.variables.clone()))?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }
}
