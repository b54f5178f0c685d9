//! Interview practice wizard core: state machine, voice capture, view model
//! and the HTTP client for the question/evaluation service.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod voice;
pub mod wizard;

pub use api::{HttpInterviewClient, InterviewApi};
pub use config::{Profile, WizardConfig};
pub use controller::WizardController;
pub use error::{CapabilityError, WizardError};
pub use render::{render, View};
pub use voice::{
    CaptureId, MicrophoneAccess, SpeechEngine, SpeechEventSink, UnavailableMicrophone,
    UnsupportedSpeechEngine,
};
pub use wizard::{transition, Effect, Panel, WizardEvent, WizardState};
