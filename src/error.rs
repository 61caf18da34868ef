use planboard_views::ViewError;
use thiserror::Error;

/// Errors surfaced by the `pb` command line
#[derive(Error, Debug)]
pub enum CliError {
    /// A view-model operation rejected the request
    #[error(transparent)]
    View(#[from] ViewError),

    /// The snapshot could not be read
    #[error("Failed to read snapshot from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON for the expected shape
    #[error("Invalid snapshot in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// A result could not be encoded as JSON
    #[error("Failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use planboard_views::EntityKind;

    #[test]
    fn test_view_error_is_transparent() {
        let err: CliError = ViewError::not_found(EntityKind::Task, "t9").into();
        assert_eq!(err.to_string(), "task 't9' not found");
        assert!(matches!(err, CliError::View(ViewError::NotFound { .. })));
    }

    #[test]
    fn test_read_error_display() {
        let err = CliError::Read {
            path: "/missing.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read snapshot from /missing.json: no such file"
        );
    }

    #[test]
    fn test_parse_error_display_names_origin() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CliError::Parse {
            origin: "stdin".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid snapshot in stdin: "));
    }
}
