//! Pure wizard state machine.
//!
//! [`transition`] maps the current [`WizardState`] and one [`WizardEvent`] to
//! the next state plus the [`Effect`]s the caller must execute. Nothing in
//! here touches the network, timers or the speech engine.

use std::time::Duration;

use shared::{
    domain::{InterviewType, Question},
    error::ApiFailure,
    protocol::{EvaluationRequest, Feedback, QuestionResponse, SelectTypeResponse},
};
use tracing::{debug, info, warn};

use crate::{
    config::WizardConfig,
    error::{Action, CapabilityError, NoticeKind, WizardError},
    voice::{CaptureId, CaptureStatus, SpeechEvent, SpeechOutcome, VoiceCapture},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Landing,
    TypeSelect,
    TechSelect,
    Question,
    Feedback,
}

impl Panel {
    pub fn progress_step(self) -> u8 {
        match self {
            Self::Landing | Self::TypeSelect => 1,
            Self::TechSelect => 2,
            Self::Question => 3,
            Self::Feedback => 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub interview_type: Option<InterviewType>,
    pub technology: Option<String>,
    pub current_question: Option<Question>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.interview_type.is_none()
            && self.technology.is_none()
            && self.current_question.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    SelectType(InterviewType),
    ListTechnologies,
    SelectTechnology(String),
    Evaluate(EvaluationRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    TypeSelected(Result<SelectTypeResponse, ApiFailure>),
    TechnologiesListed(Result<Vec<String>, ApiFailure>),
    TechnologySelected(Result<QuestionResponse, ApiFailure>),
    Evaluated(Result<Feedback, ApiFailure>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    Start,
    ChooseType(InterviewType),
    ChooseTechnology(String),
    EditAnswer(String),
    ClearAnswer,
    SubmitAnswer,
    Restart,
    ToggleMic,
    Response {
        request_id: RequestId,
        outcome: CallOutcome,
    },
    NoticeExpired(u64),
    MicrophoneGranted,
    MicrophoneDenied(CapabilityError),
    RecognitionFailed {
        capture: CaptureId,
        error: CapabilityError,
    },
    Speech {
        capture: CaptureId,
        event: SpeechEvent,
    },
    RecordingTick {
        capture: CaptureId,
        elapsed: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Call {
        request_id: RequestId,
        call: ApiCall,
    },
    DismissNoticeAfter {
        notice_id: u64,
        delay: Duration,
    },
    RequestMicrophone,
    StartRecognition(CaptureId),
    StopRecognition,
    StartRecordingTimer(CaptureId),
    StopRecordingTimer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingStep {
    SelectType(InterviewType),
    ListTechnologies,
    SelectTechnology(String),
    Evaluate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingCall {
    request_id: RequestId,
    step: PendingStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    config: WizardConfig,
    panel: Panel,
    session: Session,
    technologies: Vec<String>,
    feedback: Option<Feedback>,
    answer: String,
    pending: Option<PendingCall>,
    notice: Option<Notice>,
    voice: VoiceCapture,
    next_request_id: u64,
    next_notice_id: u64,
}

/// Applies one event to `state`, returning the next state and its effects.
pub fn transition(mut state: WizardState, event: WizardEvent) -> (WizardState, Vec<Effect>) {
    let effects = state.apply(event);
    (state, effects)
}

impl WizardState {
    pub fn new(config: WizardConfig, speech_supported: bool) -> Self {
        let panel = if config.landing {
            Panel::Landing
        } else {
            Panel::TypeSelect
        };
        let voice = VoiceCapture::new(config.voice && speech_supported);
        Self {
            config,
            panel,
            session: Session::default(),
            technologies: Vec::new(),
            feedback: None,
            answer: String::new(),
            pending: None,
            notice: None,
            voice,
            next_request_id: 0,
            next_notice_id: 0,
        }
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn technologies(&self) -> &[String] {
        &self.technologies
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn voice(&self) -> &VoiceCapture {
        &self.voice
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// True while an outcome the user is waiting for is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.is_loading() || self.voice.status() == CaptureStatus::AwaitingPermission
    }

    pub fn apply(&mut self, event: WizardEvent) -> Vec<Effect> {
        match event {
            WizardEvent::Start => self.start(),
            WizardEvent::ChooseType(interview_type) => self.choose_type(interview_type),
            WizardEvent::ChooseTechnology(technology) => self.choose_technology(technology),
            WizardEvent::EditAnswer(text) => {
                self.answer = text;
                Vec::new()
            }
            WizardEvent::ClearAnswer => {
                self.answer.clear();
                Vec::new()
            }
            WizardEvent::SubmitAnswer => self.submit_answer(),
            WizardEvent::Restart => self.restart(),
            WizardEvent::ToggleMic => self.toggle_mic(),
            WizardEvent::Response {
                request_id,
                outcome,
            } => self.on_response(request_id, outcome),
            WizardEvent::NoticeExpired(id) => {
                if self.notice.as_ref().is_some_and(|notice| notice.id == id) {
                    self.notice = None;
                }
                Vec::new()
            }
            WizardEvent::MicrophoneGranted => self.voice.microphone_granted(),
            WizardEvent::MicrophoneDenied(err) => {
                warn!(error = %err, "microphone access denied");
                if self.voice.microphone_denied() {
                    vec![self.raise(err.into())]
                } else {
                    Vec::new()
                }
            }
            WizardEvent::RecognitionFailed { capture, error } => {
                match self.voice.recognition_failed(capture) {
                    Some(mut effects) => {
                        warn!(error = ?error, capture = capture.0, "speech recognition could not start");
                        effects.push(self.raise(error.into()));
                        effects
                    }
                    None => Vec::new(),
                }
            }
            WizardEvent::Speech { capture, event } => self.on_speech(capture, event),
            WizardEvent::RecordingTick { capture, elapsed } => {
                self.voice.tick(capture, elapsed);
                Vec::new()
            }
        }
    }

    fn start(&mut self) -> Vec<Effect> {
        if self.panel == Panel::Landing {
            self.panel = Panel::TypeSelect;
        }
        Vec::new()
    }

    fn choose_type(&mut self, interview_type: InterviewType) -> Vec<Effect> {
        if self.panel != Panel::TypeSelect || self.busy_with_call("choose type") {
            return Vec::new();
        }
        info!(%interview_type, "selecting interview type");
        vec![self.issue(
            PendingStep::SelectType(interview_type),
            ApiCall::SelectType(interview_type),
        )]
    }

    fn choose_technology(&mut self, technology: String) -> Vec<Effect> {
        if self.panel != Panel::TechSelect || self.busy_with_call("choose technology") {
            return Vec::new();
        }
        info!(%technology, "selecting technology");
        vec![self.issue(
            PendingStep::SelectTechnology(technology.clone()),
            ApiCall::SelectTechnology(technology),
        )]
    }

    fn submit_answer(&mut self) -> Vec<Effect> {
        if self.panel != Panel::Question || self.busy_with_call("submit answer") {
            return Vec::new();
        }
        let answer = self.answer.trim().to_string();
        if answer.is_empty() {
            return vec![self.raise(WizardError::EmptyAnswer)];
        }
        let (Some(interview_type), Some(question)) = (
            self.session.interview_type,
            self.session.current_question.as_ref(),
        ) else {
            warn!("submit without an active question");
            return Vec::new();
        };
        let request = EvaluationRequest {
            interview_type,
            technology: self.session.technology.clone(),
            question: question.text.clone(),
            answer,
        };
        let mut effects = self.voice.stop();
        effects.push(self.issue(PendingStep::Evaluate, ApiCall::Evaluate(request)));
        effects
    }

    fn restart(&mut self) -> Vec<Effect> {
        if let Some(pending) = self.pending.take() {
            debug!(request_id = pending.request_id.0, "abandoning in-flight call");
        }
        self.session = Session::default();
        self.technologies.clear();
        self.feedback = None;
        self.answer.clear();
        self.panel = if self.config.landing && self.config.restart_to_landing {
            Panel::Landing
        } else {
            Panel::TypeSelect
        };
        info!(panel = ?self.panel, "wizard restarted");
        self.voice.stop()
    }

    fn toggle_mic(&mut self) -> Vec<Effect> {
        if self.panel != Panel::Question {
            return Vec::new();
        }
        match self.voice.toggle() {
            Ok(effects) => {
                if effects.contains(&Effect::RequestMicrophone) {
                    self.notice = None;
                }
                effects
            }
            Err(err) => vec![self.raise(err.into())],
        }
    }

    fn on_speech(&mut self, capture: CaptureId, event: SpeechEvent) -> Vec<Effect> {
        match self.voice.on_speech(capture, event) {
            SpeechOutcome::Ignored => {
                debug!(capture = capture.0, "speech event outside the current capture");
                Vec::new()
            }
            SpeechOutcome::Transcript(text) => {
                self.answer = text;
                Vec::new()
            }
            SpeechOutcome::Restart(effects) => {
                debug!("speech session ended while capturing; restarting");
                effects
            }
            SpeechOutcome::Halted { mut effects, error } => {
                warn!(error = ?error, "speech recognition halted");
                effects.push(self.raise(error.into()));
                effects
            }
        }
    }

    fn on_response(&mut self, request_id: RequestId, outcome: CallOutcome) -> Vec<Effect> {
        let step = match self.pending.take() {
            Some(pending) if pending.request_id == request_id => pending.step,
            other => {
                debug!(request_id = request_id.0, "discarding stale response");
                self.pending = other;
                return Vec::new();
            }
        };

        match (step, outcome) {
            (PendingStep::SelectType(interview_type), CallOutcome::TypeSelected(result)) => {
                self.on_type_selected(interview_type, result)
            }
            (PendingStep::ListTechnologies, CallOutcome::TechnologiesListed(result)) => {
                match result {
                    Ok(technologies) => {
                        self.session.interview_type = Some(InterviewType::Technical);
                        self.technologies = technologies;
                        self.panel = Panel::TechSelect;
                        Vec::new()
                    }
                    Err(err) => vec![self.fail(Action::LoadTechnologies, err)],
                }
            }
            (PendingStep::SelectTechnology(technology), CallOutcome::TechnologySelected(result)) => {
                match result {
                    Ok(response) => {
                        self.session.technology = Some(technology);
                        self.show_question(Question::new(response.question, response.category));
                        Vec::new()
                    }
                    Err(err) => vec![self.fail(Action::SelectTechnology, err)],
                }
            }
            (PendingStep::Evaluate, CallOutcome::Evaluated(result)) => match result {
                Ok(feedback) => {
                    self.feedback = Some(feedback);
                    self.panel = Panel::Feedback;
                    Vec::new()
                }
                Err(err) => vec![self.fail(Action::Evaluate, err)],
            },
            (step, outcome) => {
                warn!(?step, ?outcome, "response does not match pending call");
                Vec::new()
            }
        }
    }

    fn on_type_selected(
        &mut self,
        interview_type: InterviewType,
        result: Result<SelectTypeResponse, ApiFailure>,
    ) -> Vec<Effect> {
        let response = match result {
            Ok(response) => response,
            Err(err) => return vec![self.fail(Action::SelectType, err)],
        };
        match interview_type {
            InterviewType::Hr => {
                let Some(text) = response.question else {
                    return vec![self.fail(Action::SelectType, ApiFailure::MissingField("question"))];
                };
                let category = response
                    .category
                    .unwrap_or_else(|| interview_type.to_string());
                self.session.interview_type = Some(interview_type);
                self.show_question(Question::new(text, category));
                Vec::new()
            }
            InterviewType::Technical => {
                vec![self.issue(PendingStep::ListTechnologies, ApiCall::ListTechnologies)]
            }
        }
    }

    fn show_question(&mut self, question: Question) {
        self.session.current_question = Some(question);
        self.panel = Panel::Question;
    }

    fn busy_with_call(&self, action: &str) -> bool {
        if self.pending.is_some() {
            debug!(action, "ignored while a request is in flight");
            return true;
        }
        false
    }

    fn issue(&mut self, step: PendingStep, call: ApiCall) -> Effect {
        self.next_request_id += 1;
        let request_id = RequestId(self.next_request_id);
        self.pending = Some(PendingCall { request_id, step });
        Effect::Call { request_id, call }
    }

    fn fail(&mut self, action: Action, source: ApiFailure) -> Effect {
        warn!(action = action.describe(), error = %source, "remote call failed");
        self.raise(WizardError::network(action, source))
    }

    fn raise(&mut self, error: WizardError) -> Effect {
        self.next_notice_id += 1;
        let notice_id = self.next_notice_id;
        self.notice = Some(Notice {
            id: notice_id,
            kind: error.kind(),
            message: error.to_string(),
        });
        Effect::DismissNoticeAfter {
            notice_id,
            delay: self.config.notice_duration,
        }
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
