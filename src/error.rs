use std::fmt;

use thiserror::Error;

/// Error raised by an installer script: a bad directive, a missing file,
/// a failed command. `faulty_data` is the offending piece of the script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptingError {
    pub message: String,
    pub faulty_data: Option<String>,
}

impl ScriptingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            faulty_data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: impl fmt::Debug) -> Self {
        Self {
            message: message.into(),
            faulty_data: Some(format!("{:?}", data)),
        }
    }
}

impl fmt::Display for ScriptingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.faulty_data {
            Some(data) if !data.is_empty() => write!(f, "{}\n{}", self.message, data),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ScriptingError {}

/// Archive extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Could not extract `{0}` - no appropriate extractor found")]
    NoExtractor(String),

    #[error("Could not extract `{0}` - unknown format specified")]
    UnknownFormat(String),

    #[error("{0} is not found in the runtime or on the system")]
    MissingTool(&'static str),

    #[error("{tool} failed to extract {path} (exit code {code:?})")]
    ToolFailed {
        tool: &'static str,
        path: String,
        code: Option<i32>,
    },

    #[error("specified exe is not an archive or GOG setup file")]
    NotAnArchive,

    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Errors while fetching installer files.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Download failed: HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Unsupported URL {0}")]
    UnsupportedUrl(String),

    #[error("{hash_type} checksum mismatch\n{expected} != {actual}")]
    ChecksumMismatch {
        hash_type: String,
        expected: String,
        actual: String,
    },

    #[error("Unsupported checksum type: {0}")]
    UnsupportedChecksum(String),
}

/// Installed-games registry errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("game registry {path} is corrupt, fix or remove it: {source}")]
    CorruptRegistry {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Scripting(#[from] ScriptingError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("installation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}

impl From<sevenz_rust2::Error> for Error {
    fn from(err: sevenz_rust2::Error) -> Self {
        Error::Extract(ExtractError::Failed(err.to_string()))
    }
}

impl From<std::path::StripPrefixError> for Error {
    fn from(err: std::path::StripPrefixError) -> Self {
        Error::Io(std::io::Error::other(err.to_string()))
    }
}

/// Shorthand for the common `return Err(ScriptingError::new(..).into())`.
pub fn scripting<T>(message: impl Into<String>) -> Result<T> {
    Err(ScriptingError::new(message).into())
}
