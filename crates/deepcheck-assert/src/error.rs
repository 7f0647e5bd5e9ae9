use deepcheck_kernel::{ComparisonError, ConfigError, IntrospectionError};

/// Why an assertion did not pass.
#[derive(Debug, thiserror::Error)]
pub enum AssertionError {
    /// The values were checked and did not meet the expectation. The message
    /// is the complete rendered diagnostic.
    #[error("{message}")]
    Failed { message: String },

    #[error("invalid assertion configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error(transparent)]
    Introspection(#[from] IntrospectionError),
}

impl AssertionError {
    pub(crate) fn failed(description: Option<&str>, message: String) -> Self {
        let message = match description {
            Some(description) => format!("[{description}] {message}"),
            None => message,
        };
        Self::Failed { message }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
