//! Voice capture: the speech engine seam and the capture state machine.
//!
//! The engine reports through three callbacks on [`SpeechEventSink`]. Those
//! callbacks only enqueue [`WizardEvent::Speech`] events; all decisions
//! (transcript replacement, automatic restart on end, halting on errors) are
//! made by [`VoiceCapture`] when the controller applies the event.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{error::CapabilityError, wizard::Effect, wizard::WizardEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechErrorKind {
    NotAllowed,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Every segment recognized so far in this capture, partial or final.
    Result { segments: Vec<String> },
    Error(SpeechErrorKind),
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl RecognitionSettings {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            continuous: true,
            interim_results: true,
        }
    }
}

/// Identifies one capture session, from microphone grant to stop.
///
/// Engines keep firing callbacks for a while after `stop()`; events tagged
/// with an earlier id are dropped by [`VoiceCapture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CaptureId(pub u64);

/// Callback surface handed to a [`SpeechEngine`] on start.
#[derive(Debug, Clone)]
pub struct SpeechEventSink {
    capture: CaptureId,
    tx: mpsc::UnboundedSender<WizardEvent>,
}

impl SpeechEventSink {
    pub(crate) fn new(capture: CaptureId, tx: mpsc::UnboundedSender<WizardEvent>) -> Self {
        Self { capture, tx }
    }

    pub fn capture(&self) -> CaptureId {
        self.capture
    }

    pub fn on_result(&self, segments: Vec<String>) {
        self.emit(SpeechEvent::Result { segments });
    }

    pub fn on_error(&self, kind: SpeechErrorKind) {
        self.emit(SpeechEvent::Error(kind));
    }

    pub fn on_end(&self) {
        self.emit(SpeechEvent::End);
    }

    fn emit(&self, event: SpeechEvent) {
        let capture = self.capture;
        if self.tx.send(WizardEvent::Speech { capture, event }).is_err() {
            tracing::debug!("speech event dropped: controller is gone");
        }
    }
}

pub trait SpeechEngine: Send {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(
        &mut self,
        settings: &RecognitionSettings,
        sink: SpeechEventSink,
    ) -> Result<(), CapabilityError>;

    fn stop(&mut self);
}

pub struct UnsupportedSpeechEngine;

impl SpeechEngine for UnsupportedSpeechEngine {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(
        &mut self,
        _settings: &RecognitionSettings,
        _sink: SpeechEventSink,
    ) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported)
    }

    fn stop(&mut self) {}
}

#[async_trait]
pub trait MicrophoneAccess: Send + Sync {
    async fn request_access(&self) -> Result<(), CapabilityError>;
}

pub struct UnavailableMicrophone;

#[async_trait]
impl MicrophoneAccess for UnavailableMicrophone {
    async fn request_access(&self) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    Off,
    AwaitingPermission,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    Ignored,
    Transcript(String),
    Restart(Vec<Effect>),
    Halted {
        effects: Vec<Effect>,
        error: CapabilityError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCapture {
    supported: bool,
    status: CaptureStatus,
    capture: CaptureId,
    elapsed: Option<Duration>,
}

impl VoiceCapture {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            status: CaptureStatus::Off,
            capture: CaptureId::default(),
            elapsed: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == CaptureStatus::Active
    }

    /// The running capture session, if any.
    pub fn current(&self) -> Option<CaptureId> {
        self.is_active().then_some(self.capture)
    }

    fn is_current(&self, capture: CaptureId) -> bool {
        self.current() == Some(capture)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn toggle(&mut self) -> Result<Vec<Effect>, CapabilityError> {
        if !self.supported {
            return Err(CapabilityError::Unsupported);
        }
        match self.status {
            CaptureStatus::Off => {
                self.status = CaptureStatus::AwaitingPermission;
                Ok(vec![Effect::RequestMicrophone])
            }
            CaptureStatus::AwaitingPermission => Ok(Vec::new()),
            CaptureStatus::Active => Ok(self.stop()),
        }
    }

    pub fn microphone_granted(&mut self) -> Vec<Effect> {
        if self.status != CaptureStatus::AwaitingPermission {
            return Vec::new();
        }
        self.status = CaptureStatus::Active;
        self.capture = CaptureId(self.capture.0 + 1);
        self.elapsed = Some(Duration::ZERO);
        vec![
            Effect::StartRecognition(self.capture),
            Effect::StartRecordingTimer(self.capture),
        ]
    }

    /// Returns whether the denial belonged to an outstanding request.
    pub fn microphone_denied(&mut self) -> bool {
        if self.status != CaptureStatus::AwaitingPermission {
            return false;
        }
        self.status = CaptureStatus::Off;
        true
    }

    pub fn recognition_failed(&mut self, capture: CaptureId) -> Option<Vec<Effect>> {
        self.is_current(capture).then(|| self.stop())
    }

    pub fn on_speech(&mut self, capture: CaptureId, event: SpeechEvent) -> SpeechOutcome {
        if !self.is_current(capture) {
            return SpeechOutcome::Ignored;
        }
        match event {
            SpeechEvent::Result { segments } => SpeechOutcome::Transcript(segments.concat()),
            SpeechEvent::End => SpeechOutcome::Restart(vec![Effect::StartRecognition(capture)]),
            SpeechEvent::Error(kind) => {
                let error = match kind {
                    SpeechErrorKind::NotAllowed => CapabilityError::PermissionDenied,
                    SpeechErrorKind::Other(reason) => CapabilityError::Recognition(reason),
                };
                SpeechOutcome::Halted {
                    effects: self.stop(),
                    error,
                }
            }
        }
    }

    pub fn tick(&mut self, capture: CaptureId, elapsed: Duration) {
        if self.is_current(capture) {
            self.elapsed = Some(elapsed);
        }
    }

    pub fn stop(&mut self) -> Vec<Effect> {
        let was = self.status;
        self.status = CaptureStatus::Off;
        self.elapsed = None;
        match was {
            CaptureStatus::Active => vec![Effect::StopRecognition, Effect::StopRecordingTimer],
            CaptureStatus::Off | CaptureStatus::AwaitingPermission => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/voice_tests.rs"]
mod tests;
