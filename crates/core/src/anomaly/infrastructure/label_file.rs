use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::anomaly::domain::class_labels::ClassLabels;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("failed to read label file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid label file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("label file {0} contains no labels")]
    Empty(PathBuf),
}

/// Load class names from a JSON array (`["phone", "camera"]`) or a text
/// file with one name per line. Blank lines are skipped.
pub fn load(path: &Path) -> Result<ClassLabels, LabelError> {
    let contents = fs::read_to_string(path).map_err(|e| LabelError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let names: Vec<String> = if contents.trim_start().starts_with('[') {
        serde_json::from_str(&contents).map_err(|e| LabelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?
    } else {
        contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    };

    if names.is_empty() {
        return Err(LabelError::Empty(path.to_path_buf()));
    }
    log::info!("Loaded {} class label(s) from {}", names.len(), path.display());
    Ok(ClassLabels::new(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_loads_json_array() {
        let tmp = TempDir::new().unwrap();
        let labels = load(&write(&tmp, "labels.json", r#"["phone", "camera", "paper"]"#)).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.name(2), Some("paper"));
    }

    #[test]
    fn test_loads_line_per_label() {
        let tmp = TempDir::new().unwrap();
        let labels = load(&write(&tmp, "labels.txt", "phone\n  camera \n\npaper\n")).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.name(1), Some("camera"));
    }

    #[test]
    fn test_empty_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = load(&write(&tmp, "labels.txt", "\n\n")).unwrap_err();
        assert!(matches!(err, LabelError::Empty(_)));
    }

    #[test]
    fn test_bad_json_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = load(&write(&tmp, "labels.json", "[1, 2")).unwrap_err();
        assert!(matches!(err, LabelError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = load(&tmp.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, LabelError::Read { .. }));
    }
}
