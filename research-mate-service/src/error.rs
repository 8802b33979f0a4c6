use thiserror::Error;

/// Startup failures. All of them halt the process before any input is accepted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY not found. Set it in the environment, a .env file, or GEMINI_API_KEY_FILE")]
    MissingCredential,

    #[error("Failed to read secret file {path}: {source}")]
    SecretFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Failures of a single analysis attempt. None of them are retried.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("Summary generation failed: {0}")]
    Generation(String),

    #[error("No document is bound to the session")]
    Unbound,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
