use reqwest::StatusCode;
use thiserror::Error;

/// API-specific errors for st2-api
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Core domain error: {0}")]
    Core(#[from] st2_core::St2Error),
}

#[derive(Error, Debug)]
pub enum HttpError {
    /// Non-2xx response
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl HttpError {
    /// Build a status error with a message of the form
    /// `404 Client Error: Not Found for url: https://host/api/v1/executions/x`
    pub fn from_status(status: StatusCode, url: &str) -> Self {
        let class = if status.is_server_error() {
            "Server"
        } else {
            "Client"
        };
        let reason = status.canonical_reason().unwrap_or("Unknown");

        HttpError::Status {
            status: status.as_u16(),
            message: format!(
                "{} {} Error: {} for url: {}",
                status.as_u16(),
                class,
                reason,
                url
            ),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

impl ApiError {
    /// Status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(e) => e.status(),
            ApiError::Core(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ApiError::Core(st2_core::St2Error::InvalidInput(_)))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use st2_core::St2Error;

    #[test]
    fn test_not_found_message() {
        let err = HttpError::from_status(StatusCode::NOT_FOUND, "https://st2/api/v1/executions/x");
        assert_eq!(
            err.to_string(),
            "404 Client Error: Not Found for url: https://st2/api/v1/executions/x"
        );
        assert_eq!(err.status(), Some(404));

        let err = ApiError::from(err);
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_server_error_message() {
        let err = HttpError::from_status(StatusCode::BAD_GATEWAY, "https://st2/");
        assert_eq!(
            err.to_string(),
            "502 Server Error: Bad Gateway for url: https://st2/"
        );
        assert!(!ApiError::from(err).is_not_found());
    }

    #[test]
    fn test_invalid_argument() {
        let err = ApiError::from(St2Error::missing_argument("id"));
        assert!(err.is_invalid_argument());
        assert_eq!(err.status(), None);
    }
}
