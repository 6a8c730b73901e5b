use thiserror::Error;

/// Failure of a single call to the remote completion service.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error ({status}) {kind}: {message}")]
    Service {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl RequestError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn service(status: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// HTTP status reported by the service, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DomainError {
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Request(RequestError::Cancelled))
    }

    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::IoError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_message_includes_status_and_kind() {
        let err = RequestError::service(401, "authentication_error", "invalid x-api-key");
        assert_eq!(
            err.to_string(),
            "Service error (401) authentication_error: invalid x-api-key"
        );
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn request_error_passes_through_domain_error_unchanged() {
        let err: DomainError = RequestError::transport("connection refused").into();
        assert!(err.is_request_error());
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn cancelled_is_detected() {
        let err: DomainError = RequestError::Cancelled.into();
        assert!(err.is_cancelled());
        assert!(RequestError::Cancelled.status().is_none());
    }
}
