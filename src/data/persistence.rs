use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Set once at startup by main() from the --data-dir argument.
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Call this from main() before any load/save operations.
pub fn set_data_dir(path: PathBuf) {
    let _ = DATA_DIR.set(path);
}

pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = DATA_DIR.get() {
        return Ok(dir.clone());
    }
    // Fallback when running tests or if set_data_dir was not called
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(cwd.join("config"))
}

pub fn get_file_path(name: &str) -> Result<PathBuf> {
    let dir = get_data_dir()?;
    Ok(dir.join(name))
}

/// A document the planner keeps on disk: the settings config.yaml and the
/// week_info.json export written by the backend.
pub trait Persistable: Sized + Default + Serialize + for<'de> Deserialize<'de> {
    fn filename() -> &'static str;
    fn is_json() -> bool;

    /// Loads the document, or its default when the file does not exist.
    fn load() -> Result<Self> {
        Ok(Self::load_optional()?.unwrap_or_default())
    }

    /// Loads the document, or None when the file does not exist. Week info is
    /// read through this: an absent export is a real state, not a default.
    fn load_optional() -> Result<Option<Self>> {
        let path = get_file_path(Self::filename())?;
        read_document(&path)
    }

    fn save(&self) -> Result<()> {
        let path = get_file_path(Self::filename())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {}", parent.display()))?;
        }
        write_document(self, &path)
    }

    /// Load from an explicit directory, bypassing the global `DATA_DIR`.
    fn load_from(dir: &Path) -> Result<Self> {
        Ok(read_document(&dir.join(Self::filename()))?.unwrap_or_default())
    }

    /// Save to an explicit directory, bypassing the global `DATA_DIR`.
    fn save_to(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create dir {}", dir.display()))?;
        write_document(self, &dir.join(Self::filename()))
    }
}

fn read_document<T: Persistable>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = if T::is_json() {
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON from {}", path.display()))?
    } else {
        serde_norway::from_str(&contents)
            .with_context(|| format!("failed to parse YAML from {}", path.display()))?
    };
    Ok(Some(parsed))
}

fn write_document<T: Persistable>(doc: &T, path: &Path) -> Result<()> {
    let contents = if T::is_json() {
        serde_json::to_string_pretty(doc).context("failed to serialize JSON")?
    } else {
        serde_norway::to_string(doc).context("failed to serialize YAML")?
    };
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct TestJsonData {
        value: String,
    }

    impl Persistable for TestJsonData {
        fn filename() -> &'static str {
            "test_data.json"
        }
        fn is_json() -> bool {
            true
        }
    }

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct TestYamlData {
        count: u32,
    }

    impl Persistable for TestYamlData {
        fn filename() -> &'static str {
            "test_data.yaml"
        }
        fn is_json() -> bool {
            false
        }
    }

    #[test]
    fn test_get_data_dir_returns_a_path() {
        // When DATA_DIR is unset the fallback is cwd/config.
        // When it IS set (by a prior test run), it returns that value.
        // Either way a valid PathBuf should be returned.
        let result = get_data_dir();
        assert!(result.is_ok());
    }

    #[test]
    fn test_get_file_path_appends_filename() {
        let path = get_file_path("week_info.json").unwrap();
        assert!(path.ends_with("week_info.json"));
    }

    #[test]
    fn test_load_from_returns_default_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let result: TestJsonData = TestJsonData::load_from(tmp.path()).unwrap();
        assert_eq!(result, TestJsonData::default());
    }

    #[test]
    fn test_json_save_to_and_load_from_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let data = TestJsonData {
            value: "round-trip".to_string(),
        };
        data.save_to(tmp.path()).unwrap();
        let loaded = TestJsonData::load_from(tmp.path()).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_yaml_save_to_and_load_from_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let data = TestYamlData { count: 99 };
        data.save_to(tmp.path()).unwrap();
        let loaded = TestYamlData::load_from(tmp.path()).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_read_document_none_for_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result: Option<TestJsonData> =
            read_document(&tmp.path().join("test_data.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_document_some_for_existing_file() {
        let tmp = TempDir::new().unwrap();
        let data = TestJsonData {
            value: "present".to_string(),
        };
        data.save_to(tmp.path()).unwrap();
        let result: Option<TestJsonData> =
            read_document(&tmp.path().join("test_data.json")).unwrap();
        assert_eq!(result.unwrap().value, "present");
    }

    #[test]
    fn test_read_document_error_for_malformed_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test_data.json");
        fs::write(&path, "{ not json").unwrap();
        let result: Result<Option<TestJsonData>> = read_document(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_to_creates_directory_if_missing() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        let data = TestJsonData {
            value: "nested".to_string(),
        };
        data.save_to(&nested).unwrap();
        let loaded = TestJsonData::load_from(&nested).unwrap();
        assert_eq!(loaded, data);
    }
}
