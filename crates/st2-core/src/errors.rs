use thiserror::Error;

/// Core domain errors - no I/O dependencies
#[derive(Error, Debug)]
pub enum St2Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl St2Error {
    /// Build an `InvalidInput` error for a required argument that was empty
    pub fn missing_argument(name: &str) -> Self {
        St2Error::InvalidInput(format!("'{}' argument must be supplied", name))
    }
}

pub type Result<T> = std::result::Result<T, St2Error>;
