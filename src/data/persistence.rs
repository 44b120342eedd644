use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

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
    Ok(cwd.join("data"))
}

/// A file-backed document. JSON or YAML is chosen per type.
pub trait Persistable: Sized + Default + Serialize + for<'de> Deserialize<'de> {
    fn filename() -> &'static str;
    fn is_json() -> bool;

    fn load() -> Result<Self> {
        Self::load_from(&get_data_dir()?)
    }

    fn save(&self) -> Result<()> {
        self.save_to(&get_data_dir()?)
    }

    /// Load from an explicit directory. A missing file yields `Default`.
    fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join(Self::filename());
        if !path.exists() {
            debug!(path = %path.display(), "no data file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::decode(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Save to an explicit directory, creating it when missing.
    fn save_to(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create dir {}", dir.display()))?;
        let path = dir.join(Self::filename());
        fs::write(&path, self.encode()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), "saved data file");
        Ok(())
    }

    fn decode(contents: &str) -> Result<Self> {
        if Self::is_json() {
            serde_json::from_str(contents).context("invalid JSON")
        } else {
            serde_norway::from_str(contents).context("invalid YAML")
        }
    }

    fn encode(&self) -> Result<String> {
        if Self::is_json() {
            serde_json::to_string_pretty(self).context("failed to serialize JSON")
        } else {
            serde_norway::to_string(self).context("failed to serialize YAML")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_load_from_returns_default_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let result = TestJsonData::load_from(tmp.path()).unwrap();
        assert_eq!(result, TestJsonData::default());
    }

    #[test]
    fn test_json_save_to_and_load_from() {
        let tmp = TempDir::new().unwrap();
        let data = TestJsonData { value: "stored".to_string() };
        data.save_to(tmp.path()).unwrap();
        assert_eq!(TestJsonData::load_from(tmp.path()).unwrap(), data);
    }

    #[test]
    fn test_yaml_save_to_and_load_from() {
        let tmp = TempDir::new().unwrap();
        let data = TestYamlData { count: 99 };
        data.save_to(tmp.path()).unwrap();
        let text = fs::read_to_string(tmp.path().join("test_data.yaml")).unwrap();
        assert!(text.contains("count: 99"));
        assert_eq!(TestYamlData::load_from(tmp.path()).unwrap(), data);
    }

    #[test]
    fn test_load_from_reports_parse_errors_with_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("test_data.json"), "{ not json").unwrap();
        let err = TestJsonData::load_from(tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("test_data.json"));
    }

    #[test]
    fn test_save_to_creates_directory_if_missing() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        let data = TestJsonData { value: "nested".to_string() };
        data.save_to(&nested).unwrap();
        assert_eq!(TestJsonData::load_from(&nested).unwrap(), data);
    }

    #[test]
    fn test_work_records_file_is_a_json_array() {
        use crate::data::work_record::{WorkRecord, WorkRecordData};
        let tmp = TempDir::new().unwrap();
        let mut data = WorkRecordData::default();
        data.upsert(WorkRecord::new("2025-03-15").with_check_in("08:45"));
        data.save_to(tmp.path()).unwrap();
        let text = fs::read_to_string(tmp.path().join("work_records.json")).unwrap();
        assert!(text.trim_start().starts_with('['));
        let loaded = WorkRecordData::load_from(tmp.path()).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].check_in.as_deref(), Some("08:45"));
    }
}
