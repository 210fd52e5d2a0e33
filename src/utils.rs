use std::env;
use std::path::PathBuf;

/// Environment variable holding the directory region files are read from.
pub const DATA_DIR_ENV: &str = "SOLARSTAT_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "data";

/// The data directory from [`DATA_DIR_ENV`], or [`DEFAULT_DATA_DIR`] when unset or blank.
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(env::var(DATA_DIR_ENV).ok())
}

fn data_dir_from(value: Option<String>) -> PathBuf {
    value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_fallback() {
        assert_eq!(data_dir_from(None), PathBuf::from("data"));
        assert_eq!(data_dir_from(Some("  ".into())), PathBuf::from("data"));
        assert_eq!(
            data_dir_from(Some("/srv/solar".into())),
            PathBuf::from("/srv/solar")
        );
    }
}
