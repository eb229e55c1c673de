use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MEASUREMENTS_KEY: &str = "biosignal_measurements";

/// Where the key-value namespace lives and which key holds the measurement list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
    pub measurements_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".biosignal"),
            file_name: "storage.json".to_string(),
            measurements_key: MEASUREMENTS_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}
