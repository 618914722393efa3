/// Errors raised while constructing or driving a status store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("status store must be created inside a tokio runtime")]
    NoRuntime,
}

/// Failure reported by a status provider.
///
/// The store never surfaces these to callers: the `Display` text becomes the
/// `error` field of the published snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Provider-supplied message, shown verbatim.
    #[error("{0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("status worker failed: {0}")]
    Worker(String),
}

impl ProviderError {
    pub fn failed(message: impl Into<String>) -> Self {
        ProviderError::Failed(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_displays_message_verbatim() {
        let err = ProviderError::failed("ECONNRESET");
        assert_eq!(err.to_string(), "ECONNRESET");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such repo");
        let err: ProviderError = io_err.into();
        assert_eq!(err.to_string(), "IO error: no such repo");
    }

    #[test]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::NoRuntime.to_string(),
            "status store must be created inside a tokio runtime"
        );
    }
}
