use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const DB_ENV_VAR: &str = "RECIPEBOX_DB";
const DB_FILE_NAME: &str = "recipebox.db";

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the database location: `--db` flag, then `RECIPEBOX_DB`, then
    /// the per-user data directory.
    pub fn load(db_flag: Option<PathBuf>) -> Result<Self> {
        let env_path = std::env::var_os(DB_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let db_path = match db_flag.or(env_path) {
            Some(path) => path,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "recipebox")
                    .context("Could not determine home directory")?;
                proj_dirs.data_dir().join(DB_FILE_NAME)
            }
        };

        ensure_parent_dir(&db_path)?;
        Ok(Config { db_path })
    }
}

fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
    }
    Ok(())
}
