use crate::regions::error::DiscoveryError;
use log::{debug, error};
use std::fs;
use std::path::{Path, PathBuf};

/// Every region file is named `<region key>` followed by this suffix.
pub const REGION_FILE_SUFFIX: &str = "_clean.csv";

/// File name holding the data of region `key`.
pub fn region_file_name(key: &str) -> String {
    format!("{key}{REGION_FILE_SUFFIX}")
}

/// Region key encoded in a file name, if the name follows the region naming convention.
pub fn region_key_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(REGION_FILE_SUFFIX)
        .filter(|key| !key.is_empty())
}

/// Discovers which regions have a dataset in a data directory.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    data_dir: PathBuf,
}

impl RegionCatalog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path the dataset of region `key` is expected at.
    pub fn region_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(region_file_name(key))
    }

    /// Region keys with a file in the data directory, sorted lexicographically.
    ///
    /// Only regular files matching `<key>_clean.csv` count.
    pub fn try_list(&self) -> Result<Vec<String>, DiscoveryError> {
        let entries = fs::read_dir(&self.data_dir)
            .map_err(|e| DiscoveryError::DataDirRead(self.data_dir.clone(), e))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DiscoveryError::DirEntryRead(self.data_dir.clone(), e))?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(key) = region_key_from_file_name(file_name) {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        debug!("Found {} regions in {}", keys.len(), self.data_dir.display());
        Ok(keys)
    }

    /// Like [`RegionCatalog::try_list`], but an unreadable data directory is logged
    /// and reported as an empty list.
    pub fn list(&self) -> Vec<String> {
        self.try_list().unwrap_or_else(|e| {
            error!("{e}: {}", error_chain_tail(&e));
            Vec::new()
        })
    }
}

fn error_chain_tail(e: &DiscoveryError) -> String {
    std::error::Error::source(e)
        .map(|source| source.to_string())
        .unwrap_or_default()
}
