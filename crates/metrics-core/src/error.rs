use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the aggregation pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required input file does not exist.
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer reported a structural problem (bad quoting, ragged
    /// rows, serialization failure).
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A column the source cannot be loaded without is absent.
    #[error("{path} is missing required column \"{column}\"")]
    MissingColumn { path: PathBuf, column: &'static str },

    /// A date value did not match any recognised format. Aborts the source's
    /// load so a dropped row can never skew the aggregates.
    #[error("{path} record {record}: unparsable date \"{value}\"")]
    DateParse {
        path: PathBuf,
        record: usize,
        value: String,
    },

    /// A channel label outside the fixed three-channel set.
    #[error("{path} record {record}: unknown channel \"{value}\"")]
    UnknownChannel {
        path: PathBuf,
        record: usize,
        value: String,
    },

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the pipeline crates.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_input_not_found() {
        let err = PipelineError::InputNotFound(PathBuf::from("/data/ppc_spend.csv"));
        assert_eq!(
            err.to_string(),
            "Input file not found: /data/ppc_spend.csv"
        );
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = PipelineError::FileRead {
            path: PathBuf::from("/data/email_campaigns.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/email_campaigns.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = PipelineError::MissingColumn {
            path: PathBuf::from("social_media_ads.csv"),
            column: "date",
        };
        assert_eq!(
            err.to_string(),
            "social_media_ads.csv is missing required column \"date\""
        );
    }

    #[test]
    fn test_error_display_date_parse() {
        let err = PipelineError::DateParse {
            path: PathBuf::from("ppc_spend.csv"),
            record: 7,
            value: "not-a-date".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ppc_spend.csv record 7: unparsable date \"not-a-date\""
        );
    }

    #[test]
    fn test_error_display_unknown_channel() {
        let err = PipelineError::UnknownChannel {
            path: PathBuf::from("website_conversions.csv"),
            record: 3,
            value: "Radio".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "website_conversions.csv record 3: unknown channel \"Radio\""
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PipelineError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
