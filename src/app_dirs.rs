use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "zenstudy";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory holding the state database and the log file.
    /// An explicit override (from `--data-dir`) always wins.
    pub fn state_dir(override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            proj_dirs.data_local_dir().to_path_buf()
        } else {
            PathBuf::from(".")
        }
    }

    pub fn db_path(override_dir: Option<&Path>) -> PathBuf {
        Self::state_dir(override_dir).join("state.db")
    }

    pub fn log_path(override_dir: Option<&Path>) -> PathBuf {
        Self::state_dir(override_dir).join("zenstudy.log")
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", APP_NAME) {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("zenstudy_config.json")
        }
    }
}
