use std::fmt;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Metadata report error: {0}")]
    Report(#[from] ReportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Application error: {0}")]
    Application(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config file parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Errors returned by the naming registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{operation} {ip}:{port} failed: {message}")]
    Request {
        operation: &'static str,
        ip: String,
        port: u16,
        message: String,
    },

    #[error("{operation} {ip}:{port} rejected with status {status}: {body}")]
    Rejected {
        operation: &'static str,
        ip: String,
        port: u16,
        status: u16,
        body: String,
    },

    #[error("Failed to create registry client: {0}")]
    Client(String),
}

/// Errors from resolving or calling the metadata endpoint
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Bootstrap config unavailable: {0}")]
    Bootstrap(String),

    #[error("Bootstrap config is not valid JSON: {0}")]
    BootstrapParse(#[from] serde_json::Error),

    #[error("Bootstrap config has no endpoint")]
    MissingEndpoint,

    #[error("Invalid metadata endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("Failed to connect to metadata endpoint {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("ReportMetadata call failed: {0}")]
    Rpc(#[from] tonic::Status),
}

/// Type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

/// Several errors collected across one lifecycle phase and reported as one value.
#[derive(Debug, Default)]
pub struct ErrorSet {
    errors: Vec<Error>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the error of a failed result; successful results are ignored.
    pub fn append<T>(&mut self, result: Result<T>) {
        if let Err(e) = result {
            self.errors.push(e);
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Collapse into a single `Result`, `Ok` when nothing was collected.
    pub fn into_result(self) -> std::result::Result<(), ErrorSet> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorSet {}
