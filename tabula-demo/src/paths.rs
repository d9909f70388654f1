//! Where the demo keeps its state database and log.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const STATE_DB: &str = "state.db";
const LOG_FILE: &str = "tabula-demo.log";

/// Files the demo writes.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoPaths {
    /// Backing file of the persisted preferences, if there is a data directory.
    pub state_db: Option<PathBuf>,
    /// Log file, overwritten on every start.
    pub log: PathBuf,
}

impl DemoPaths {
    /// Platform locations: XDG on Linux, the usual per-user folders elsewhere.
    pub fn resolve() -> Self {
        let dirs = ProjectDirs::from("dev", "tabula", "tabula-demo");
        Self::from_dirs(
            dirs.as_ref().map(ProjectDirs::data_dir),
            dirs.as_ref().map(ProjectDirs::cache_dir),
        )
    }

    /// Without a cache directory the log goes to the working directory. Without
    /// a data directory nothing is remembered.
    fn from_dirs(data: Option<&Path>, cache: Option<&Path>) -> Self {
        Self {
            state_db: data.map(|dir| dir.join(STATE_DB)),
            log: cache.map_or_else(|| PathBuf::from(LOG_FILE), |dir| dir.join(LOG_FILE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_in_their_directories() {
        let paths = DemoPaths::from_dirs(Some(Path::new("/data")), Some(Path::new("/cache")));
        assert_eq!(paths.state_db, Some(PathBuf::from("/data/state.db")));
        assert_eq!(paths.log, PathBuf::from("/cache/tabula-demo.log"));
    }

    #[test]
    fn test_missing_directories() {
        let paths = DemoPaths::from_dirs(None, None);
        assert_eq!(paths.state_db, None);
        assert_eq!(paths.log, PathBuf::from("tabula-demo.log"));
    }
}
