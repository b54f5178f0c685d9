use shared::error::ApiFailure;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("Microphone access was denied. Please allow microphone access to use voice input.")]
    PermissionDenied,
    #[error("Speech recognition is not supported in this environment")]
    Unsupported,
    #[error("Could not start microphone. Please check permissions.")]
    StartFailed(String),
    #[error("Error with speech recognition. Please try again.")]
    Recognition(String),
}

/// The remote action a network failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectType,
    LoadTechnologies,
    SelectTechnology,
    Evaluate,
}

impl Action {
    pub fn describe(self) -> &'static str {
        match self {
            Self::SelectType => "select interview type",
            Self::LoadTechnologies => "load technologies",
            Self::SelectTechnology => "select technology",
            Self::Evaluate => "evaluate answer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Please provide an answer before submitting.")]
    EmptyAnswer,
    #[error("Failed to {}: {source}", .action.describe())]
    Network { action: Action, source: ApiFailure },
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Validation,
    Network,
    Capability,
}

impl WizardError {
    pub fn network(action: Action, source: ApiFailure) -> Self {
        Self::Network { action, source }
    }

    pub fn kind(&self) -> NoticeKind {
        match self {
            Self::EmptyAnswer => NoticeKind::Validation,
            Self::Network { .. } => NoticeKind::Network,
            Self::Capability(_) => NoticeKind::Capability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_message_names_action_and_status() {
        let err = WizardError::network(Action::SelectTechnology, ApiFailure::Status { status: 500 });
        let text = err.to_string();
        assert!(text.starts_with("Failed to select technology:"), "{text}");
        assert!(text.contains("500"), "{text}");
        assert_eq!(err.kind(), NoticeKind::Network);
    }

    #[test]
    fn capability_errors_are_transparent() {
        let err = WizardError::from(CapabilityError::PermissionDenied);
        assert!(err.to_string().starts_with("Microphone access was denied."));
        assert_eq!(err.kind(), NoticeKind::Capability);
    }
}
