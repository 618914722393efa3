#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Repository not found at path: {path}: {message}")]
    RepositoryNotFound { path: String, message: String },

    #[error("Invalid path: {path}: {message}")]
    InvalidPath { path: String, message: String },

    #[error("Git2 library error: {source}")]
    Git2Error {
        #[from]
        source: git2::Error,
    },

    #[error("IO error during git operation: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}
