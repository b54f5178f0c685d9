use thiserror::Error;

/// Failure of a single call to the interview service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    #[error("HTTP error, status: {status}")]
    Status { status: u16 },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}

impl ApiFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown interview type '{0}'")]
pub struct UnknownInterviewType(pub String);
