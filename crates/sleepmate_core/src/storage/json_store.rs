use crate::config;
use crate::error::AppError;
use crate::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const STORE_ENV_VAR: &str = "SLEEPMATE_STORE_PATH";
const STORE_FILE_NAME: &str = "store.json";

/// Resolution order: environment, then the configured path, then the
/// per-user default.
pub fn store_path(configured: Option<&str>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path.trim()));
    }

    Ok(config::app_dir()?.join(STORE_FILE_NAME))
}

/// A single JSON object file mapping keys to string values. Every call
/// reads the file afresh; writes replace it whole.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_items(&self) -> Result<BTreeMap<String, String>, AppError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|err| AppError::io(err.to_string()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&content) {
            Ok(items) => Ok(items),
            Err(err) => {
                log::warn!("ignoring unreadable store {}: {err}", self.path.display());
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
        }

        let content = serde_json::to_string_pretty(items)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        std::fs::write(&self.path, content).map_err(|err| AppError::io(err.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)
                .map_err(|err| AppError::io(err.to_string()))?;
        }

        log::debug!("wrote {} keys to {}", items.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let mut items = self.read_items()?;
        items.insert(key.to_string(), value.to_string());
        self.write_items(&items)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), AppError> {
        let mut items = self.read_items()?;
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.write_items(&items)
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonFileStore, store_path};
    use crate::storage::{KeyValueStore, SLEEP_DATA_KEY, TASKS_KEY};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("sleepmate-{nanos}-{file_name}"))
    }

    #[test]
    fn missing_file_has_no_items() {
        let store = JsonFileStore::new(temp_path("missing.json"));
        assert_eq!(store.get_item(TASKS_KEY).unwrap(), None);
    }

    #[test]
    fn set_get_and_remove_round_trip() {
        let path = temp_path("store.json");
        let mut store = JsonFileStore::new(&path);

        store.set_item(TASKS_KEY, "[]").unwrap();
        store.set_item(SLEEP_DATA_KEY, "{}").unwrap();
        assert_eq!(store.get_item(TASKS_KEY).unwrap().as_deref(), Some("[]"));

        store.remove_item(SLEEP_DATA_KEY).unwrap();
        let reopened = JsonFileStore::new(&path);
        let sleep = reopened.get_item(SLEEP_DATA_KEY).unwrap();
        let tasks = reopened.get_item(TASKS_KEY).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(sleep, None);
        assert_eq!(tasks.as_deref(), Some("[]"));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = temp_path("nested");
        let path = dir.join("deeper").join("store.json");
        let mut store = JsonFileStore::new(&path);

        store.set_item(TASKS_KEY, "[]").unwrap();
        let exists = path.exists();
        fs::remove_dir_all(&dir).ok();

        assert!(exists);
    }

    #[cfg(unix)]
    #[test]
    fn store_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("private.json");
        let mut store = JsonFileStore::new(&path);
        store.set_item(TASKS_KEY, "[]").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        fs::remove_file(&path).ok();

        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_is_rewritten() {
        let path = temp_path("corrupt.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = JsonFileStore::new(&path);

        let before = store.get_item(TASKS_KEY).unwrap();
        store.set_item(TASKS_KEY, "[]").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(before, None);
        let items: std::collections::BTreeMap<String, String> =
            serde_json::from_str(&content).unwrap();
        assert_eq!(items.get(TASKS_KEY).map(String::as_str), Some("[]"));
    }

    #[test]
    fn configured_path_is_used_when_env_is_unset() {
        if std::env::var(super::STORE_ENV_VAR).is_ok() {
            return;
        }
        let path = store_path(Some("/tmp/sleepmate-configured.json")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/sleepmate-configured.json"));
    }
}
