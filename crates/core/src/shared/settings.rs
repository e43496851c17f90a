use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    APP_DIR_NAME, DEFAULT_ANOMALY_CONFIDENCE, DEFAULT_ANOMALY_MODEL_FILE, DEFAULT_EMBEDDINGS_FILE,
    DEFAULT_FACE_CONFIDENCE, DEFAULT_MATCH_THRESHOLD,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

/// Runtime configuration for both operations.
///
/// Every field has a default, so a settings file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON file of known voter embeddings.
    pub embeddings_path: PathBuf,
    /// Object-detection model used for anomaly detection.
    pub anomaly_model_path: PathBuf,
    /// Class names for the anomaly model; COCO names when absent.
    pub anomaly_labels_path: Option<PathBuf>,
    pub face_model_path: Option<PathBuf>,
    pub embedding_model_path: Option<PathBuf>,
    /// Extra directory searched for the face models before downloading.
    pub models_dir: Option<PathBuf>,
    pub match_threshold: f64,
    pub anomaly_confidence: f64,
    pub face_confidence: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            embeddings_path: PathBuf::from(DEFAULT_EMBEDDINGS_FILE),
            anomaly_model_path: PathBuf::from(DEFAULT_ANOMALY_MODEL_FILE),
            anomaly_labels_path: None,
            face_model_path: None,
            embedding_model_path: None,
            models_dir: None,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            anomaly_confidence: DEFAULT_ANOMALY_CONFIDENCE,
            face_confidence: DEFAULT_FACE_CONFIDENCE,
        }
    }
}

impl Settings {
    /// `<config_dir>/Pollwatch/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    /// Load settings from `explicit`, or from the default location.
    ///
    /// An explicit file must exist. A missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings: Settings = serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.match_threshold > 0.0) {
            return Err(SettingsError::OutOfRange {
                field: "match_threshold",
                expected: "greater than 0.0",
                value: self.match_threshold,
            });
        }
        for (field, value) in [
            ("anomaly_confidence", self.anomaly_confidence),
            ("face_confidence", self.face_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::OutOfRange {
                    field,
                    expected: "between 0.0 and 1.0",
                    value,
                });
            }
        }
        Ok(())
    }
}
