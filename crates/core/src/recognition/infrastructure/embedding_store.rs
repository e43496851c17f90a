//! Loads the enrolled-voter embedding file.
//!
//! The file is a JSON array of `{"voter_id": "...", "embedding": [...]}`
//! objects produced by the enrollment tooling. It is read once at startup.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::recognition::domain::known_face::{KnownFace, KnownFaces, KnownFacesError};

#[derive(Error, Debug)]
pub enum EmbeddingStoreError {
    #[error("failed to open embeddings file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid embeddings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] KnownFacesError),
}

pub fn load(path: &Path) -> Result<KnownFaces, EmbeddingStoreError> {
    let file = File::open(path).map_err(|e| EmbeddingStoreError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    let faces: Vec<KnownFace> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| EmbeddingStoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let known = KnownFaces::new(faces)?;

    match known.dimension() {
        Some(dim) => log::info!(
            "Loaded {} known face(s) ({dim}-d) from {}",
            known.len(),
            path.display()
        ),
        None => log::warn!(
            "Embeddings file {} is empty; no voter can be matched",
            path.display()
        ),
    }
    Ok(known)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("embeddings.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_loads_entries_in_file_order() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            r#"[
                {"voter_id": "ABC1234567", "embedding": [0.1, 0.2, 0.3]},
                {"voter_id": "XYZ7654321", "embedding": [0.4, 0.5, 0.6]}
            ]"#,
        );

        let known = load(&path).unwrap();

        assert_eq!(known.len(), 2);
        assert_eq!(known.dimension(), Some(3));
        let ids: Vec<&str> = known.iter().map(|f| f.voter_id.as_str()).collect();
        assert_eq!(ids, vec!["ABC1234567", "XYZ7654321"]);
    }

    #[test]
    fn test_empty_array_is_valid() {
        let tmp = TempDir::new().unwrap();
        let known = load(&write(&tmp, "[]")).unwrap();
        assert!(known.is_empty());
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let tmp = TempDir::new().unwrap();
        let err = load(&tmp.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, EmbeddingStoreError::Open { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let err = load(&write(&tmp, r#"[{"voter_id": 5}]"#)).unwrap_err();
        assert!(matches!(err, EmbeddingStoreError::Parse { .. }));
    }

    #[test]
    fn test_ragged_embeddings_name_offending_voter() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            r#"[
                {"voter_id": "A", "embedding": [0.1, 0.2]},
                {"voter_id": "B", "embedding": [0.1]}
            ]"#,
        );

        match load(&path).unwrap_err() {
            EmbeddingStoreError::Invalid(KnownFacesError::Dimension {
                index,
                voter_id,
                found,
                expected,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(voter_id, "B");
                assert_eq!(found, 1);
                assert_eq!(expected, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
