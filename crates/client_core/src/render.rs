//! Deterministic view model derived from [`WizardState`].

use std::time::Duration;

use shared::protocol::Feedback;

use crate::{
    error::NoticeKind,
    voice::CaptureStatus,
    wizard::{Panel, WizardState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Strengths,
    Weaknesses,
    Suggestions,
}

impl FeedbackKind {
    pub fn heading(self) -> &'static str {
        match self {
            Self::Strengths => "Strengths",
            Self::Weaknesses => "Areas for Improvement",
            Self::Suggestions => "Suggestions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSection {
    pub kind: FeedbackKind,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeView {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicView {
    pub visible: bool,
    pub recording: bool,
    pub awaiting_permission: bool,
    pub elapsed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub panel: Panel,
    pub progress_step: u8,
    pub loading: bool,
    pub notice: Option<NoticeView>,
    pub technologies: Vec<String>,
    pub question: Option<QuestionView>,
    pub answer: String,
    pub word_count: String,
    pub mic: MicView,
    pub feedback: Vec<FeedbackSection>,
}

pub fn render(state: &WizardState) -> View {
    let panel = state.panel();
    let voice = state.voice();

    let technologies = if panel == Panel::TechSelect {
        state.technologies().to_vec()
    } else {
        Vec::new()
    };

    let question = match (panel, state.session().current_question.as_ref()) {
        (Panel::Question, Some(question)) => Some(QuestionView {
            title: question.title(),
            text: question.text.clone(),
        }),
        _ => None,
    };

    let feedback = match (panel, state.feedback()) {
        (Panel::Feedback, Some(feedback)) => feedback_sections(feedback),
        _ => Vec::new(),
    };

    View {
        panel,
        progress_step: panel.progress_step(),
        loading: state.is_loading(),
        notice: state.notice().map(|notice| NoticeView {
            kind: notice.kind,
            message: notice.message.clone(),
        }),
        technologies,
        question,
        answer: state.answer().to_string(),
        word_count: word_count_label(state.answer()),
        mic: MicView {
            visible: voice.is_supported() && panel == Panel::Question,
            recording: voice.is_active(),
            awaiting_permission: voice.status() == CaptureStatus::AwaitingPermission,
            elapsed: voice.elapsed().map(format_elapsed),
        },
        feedback,
    }
}

/// Non-empty sections in display order; items are passed through untouched.
pub fn feedback_sections(feedback: &Feedback) -> Vec<FeedbackSection> {
    [
        (FeedbackKind::Strengths, &feedback.strengths),
        (FeedbackKind::Weaknesses, &feedback.weaknesses),
        (FeedbackKind::Suggestions, &feedback.suggestions),
    ]
    .into_iter()
    .filter_map(|(kind, items)| match items {
        Some(items) if !items.is_empty() => Some(FeedbackSection {
            kind,
            items: items.clone(),
        }),
        _ => None,
    })
    .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn word_count_label(text: &str) -> String {
    match word_count(text) {
        1 => "1 word".to_string(),
        n => format!("{n} words"),
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
