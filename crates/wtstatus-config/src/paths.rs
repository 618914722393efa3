use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found — set $HOME environment variable")]
    HomeNotFound,
}

/// Centralized path construction for the `~/.wtstatus/` directory layout.
///
/// Use `resolve()` in production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct StatusPaths {
    base_dir: PathBuf,
}

impl StatusPaths {
    /// Resolve paths from the user's home directory (`~/.wtstatus`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            base_dir: home.join(".wtstatus"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// The base `~/.wtstatus` directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn user_config(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }

    /// Project-level config: `<project_root>/.wtstatus/config.toml`.
    pub fn project_config(project_root: &Path) -> PathBuf {
        project_root.join(".wtstatus").join("config.toml")
    }
}
