use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Error accessing data directory '{0}'")]
    DataDirRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to read an entry of data directory '{0}'")]
    DirEntryRead(PathBuf, #[source] std::io::Error),
}
