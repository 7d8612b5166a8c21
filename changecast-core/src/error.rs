use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid repository URL: {0}")]
    InvalidRepositoryUrl(String),

    #[error("Invalid day count: {0} (must be a positive number of days)")]
    InvalidDays(u32),

    #[error("No response from {service}: {message}")]
    NoResponse { service: String, message: String },

    #[error("{service} returned {status}: {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Failed to fetch commits: {0}")]
    Fetch(String),

    #[error("A GitHub token is required to {0}")]
    MissingToken(String),

    #[error("Publishing failed: {0}")]
    Publish(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
