use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while reading social-media archives.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or did not match the export schema.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A message entry that survived filtering lacks a required field.
    #[error("Message {index} is missing required field \"{field}\"")]
    MissingField { index: usize, field: &'static str },

    /// An epoch-millisecond timestamp cannot be represented as a date.
    #[error("Timestamp out of range: {0} ms")]
    TimestampOutOfRange(i64),

    /// A follow-list entry does not have the expected nested shape.
    #[error("Invalid follow list: {0}")]
    InvalidShape(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the archive crates.
pub type Result<T> = std::result::Result<T, ArchiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ArchiveError::FileRead {
            path: PathBuf::from("/exports/message_1.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/exports/message_1.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_missing_field() {
        let err = ArchiveError::MissingField {
            index: 3,
            field: "sender_name",
        };
        assert_eq!(
            err.to_string(),
            "Message 3 is missing required field \"sender_name\""
        );
    }

    #[test]
    fn test_error_display_timestamp_out_of_range() {
        let err = ArchiveError::TimestampOutOfRange(i64::MAX);
        assert_eq!(
            err.to_string(),
            format!("Timestamp out of range: {} ms", i64::MAX)
        );
    }

    #[test]
    fn test_error_display_invalid_shape() {
        let err = ArchiveError::InvalidShape("entry 0 has no string_list_data".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid follow list: entry 0 has no string_list_data"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = ArchiveError::Config("unknown timezone".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown timezone");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ArchiveError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
