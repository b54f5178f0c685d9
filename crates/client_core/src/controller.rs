//! Effect executor around the pure wizard state machine.
//!
//! All state changes happen on the task that owns the [`WizardController`].
//! Network calls, microphone requests and timers run as spawned tasks that
//! only post [`WizardEvent`]s back into the controller's queue.

use std::{sync::Arc, time::Instant};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    api::InterviewApi,
    config::WizardConfig,
    render::{render, View},
    voice::{CaptureId, MicrophoneAccess, RecognitionSettings, SpeechEngine, SpeechEventSink},
    wizard::{ApiCall, CallOutcome, Effect, RequestId, WizardEvent, WizardState},
};

const RECORDING_TICK: Duration = Duration::from_secs(1);

pub struct WizardController {
    state: WizardState,
    api: Arc<dyn InterviewApi>,
    microphone: Arc<dyn MicrophoneAccess>,
    speech: Box<dyn SpeechEngine>,
    recognition: RecognitionSettings,
    events_tx: mpsc::UnboundedSender<WizardEvent>,
    events_rx: mpsc::UnboundedReceiver<WizardEvent>,
    recording_timer: Option<JoinHandle<()>>,
}

impl WizardController {
    pub fn new(
        config: WizardConfig,
        api: Arc<dyn InterviewApi>,
        microphone: Arc<dyn MicrophoneAccess>,
        speech: Box<dyn SpeechEngine>,
    ) -> Self {
        let recognition = RecognitionSettings::new(config.speech_lang.clone());
        let state = WizardState::new(config, speech.is_supported());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state,
            api,
            microphone,
            speech,
            recognition,
            events_tx,
            events_rx,
            recording_timer: None,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn view(&self) -> View {
        render(&self.state)
    }

    pub fn has_recording_timer(&self) -> bool {
        self.recording_timer.is_some()
    }

    /// Applies `event` and executes the resulting effects.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, event: WizardEvent) {
        let effects = self.state.apply(event);
        for effect in effects {
            self.execute(effect);
        }
    }

    pub async fn next_event(&mut self) -> Option<WizardEvent> {
        self.events_rx.recv().await
    }

    /// Waits for one queued event and applies it.
    pub async fn pump(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Processes queued events until no call or permission request is outstanding.
    pub async fn settle(&mut self) {
        while self.state.is_busy() {
            if !self.pump().await {
                break;
            }
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Call { request_id, call } => self.spawn_call(request_id, call),
            Effect::DismissNoticeAfter { notice_id, delay } => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    time::sleep(delay).await;
                    let _ = tx.send(WizardEvent::NoticeExpired(notice_id));
                });
            }
            Effect::RequestMicrophone => {
                let microphone = Arc::clone(&self.microphone);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let event = match microphone.request_access().await {
                        Ok(()) => WizardEvent::MicrophoneGranted,
                        Err(err) => WizardEvent::MicrophoneDenied(err),
                    };
                    let _ = tx.send(event);
                });
            }
            Effect::StartRecognition(capture) => {
                let sink = SpeechEventSink::new(capture, self.events_tx.clone());
                if let Err(error) = self.speech.start(&self.recognition, sink) {
                    let _ = self
                        .events_tx
                        .send(WizardEvent::RecognitionFailed { capture, error });
                } else {
                    debug!(lang = %self.recognition.lang, capture = capture.0, "speech recognition started");
                }
            }
            Effect::StopRecognition => {
                self.speech.stop();
                debug!("speech recognition stopped");
            }
            Effect::StartRecordingTimer(capture) => self.start_recording_timer(capture),
            Effect::StopRecordingTimer => self.stop_recording_timer(),
        }
    }

    fn spawn_call(&self, request_id: RequestId, call: ApiCall) {
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match call {
                ApiCall::SelectType(interview_type) => {
                    CallOutcome::TypeSelected(api.select_type(interview_type).await)
                }
                ApiCall::ListTechnologies => {
                    CallOutcome::TechnologiesListed(api.list_technologies().await)
                }
                ApiCall::SelectTechnology(technology) => {
                    CallOutcome::TechnologySelected(api.select_technology(&technology).await)
                }
                ApiCall::Evaluate(request) => CallOutcome::Evaluated(api.evaluate(&request).await),
            };
            if tx
                .send(WizardEvent::Response {
                    request_id,
                    outcome,
                })
                .is_err()
            {
                debug!(request_id = request_id.0, "response dropped: controller is gone");
            }
        });
    }

    fn start_recording_timer(&mut self, capture: CaptureId) {
        self.stop_recording_timer();
        let tx = self.events_tx.clone();
        let started = Instant::now();
        self.recording_timer = Some(tokio::spawn(async move {
            let mut ticker = time::interval(RECORDING_TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let tick = WizardEvent::RecordingTick {
                    capture,
                    elapsed: started.elapsed(),
                };
                if tx.send(tick).is_err() {
                    break;
                }
            }
        }));
        info!("recording started");
    }

    fn stop_recording_timer(&mut self) {
        if let Some(timer) = self.recording_timer.take() {
            timer.abort();
            info!("recording stopped");
        }
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        self.stop_recording_timer();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
