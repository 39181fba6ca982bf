use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("case {0} not found")]
    NotFound(String),
    #[error("summary for case {case_id} timed out after {elapsed:?}")]
    TimedOut { case_id: String, elapsed: Duration },
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to access preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preferences at {path} are not a JSON object of strings: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset {path} is malformed: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("empty input")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`drag` expects two numbers, got `{0}`")]
    BadDrag(String),
    #[error("unknown document type `{0}`")]
    BadDocumentType(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
}
