//! Line-oriented front-end: stdin commands in, rendered panels out.

use std::fmt;

use client_core::{
    error::NoticeKind,
    render::{FeedbackSection, MicView},
    Panel, View, WizardEvent,
};
use shared::domain::InterviewType;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  start                 leave the landing screen
  hr | technical        choose the interview type
  pick <n|name>         choose a technology from the list
  type <text>           replace the answer
  clear                 clear the answer
  mic                   start or stop voice input
  submit                send the answer for evaluation
  restart               start over
  help                  show this list
  quit                  exit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty input")]
    Empty,
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("no technology '{0}' in the list")]
    UnknownTechnology(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Wizard(WizardEvent),
    Help,
    Quit,
}

/// Parses one stdin line against the view currently on screen.
pub fn interpret(line: &str, view: &View) -> Result<Input, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let event = match word.to_ascii_lowercase().as_str() {
        "" => return Err(CommandError::Empty),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        "start" => WizardEvent::Start,
        "hr" | "technical" | "tech" => match word.parse::<InterviewType>() {
            Ok(interview_type) => WizardEvent::ChooseType(interview_type),
            Err(_) => return Err(CommandError::Unknown(word.to_string())),
        },
        "pick" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("pick"));
            }
            WizardEvent::ChooseTechnology(resolve_technology(rest, &view.technologies)?)
        }
        "type" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("type"));
            }
            WizardEvent::EditAnswer(rest.to_string())
        }
        "clear" => WizardEvent::ClearAnswer,
        "mic" => WizardEvent::ToggleMic,
        "submit" => WizardEvent::SubmitAnswer,
        "restart" => WizardEvent::Restart,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(Input::Wizard(event))
}

/// Accepts a 1-based list position or a case-insensitive name.
pub fn resolve_technology(arg: &str, technologies: &[String]) -> Result<String, CommandError> {
    let found = match arg.parse::<usize>() {
        Ok(position) => position
            .checked_sub(1)
            .and_then(|index| technologies.get(index)),
        Err(_) => technologies
            .iter()
            .find(|technology| technology.eq_ignore_ascii_case(arg)),
    };
    found
        .cloned()
        .ok_or_else(|| CommandError::UnknownTechnology(arg.to_string()))
}

pub fn draw(view: &View) -> String {
    Screen(view).to_string()
}

/// One full redraw of the current panel.
struct Screen<'a>(&'a View);

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(f, "---- step {}/4 ----", view.progress_step)?;

        match view.panel {
            Panel::Landing => {
                writeln!(f, "Interview practice")?;
                writeln!(f, "Type 'start' to begin.")?;
            }
            Panel::TypeSelect => {
                writeln!(f, "Choose an interview type: 'hr' or 'technical'")?;
            }
            Panel::TechSelect => {
                writeln!(f, "Choose a technology ('pick <n>'):")?;
                for (index, technology) in view.technologies.iter().enumerate() {
                    writeln!(f, "  {}. {technology}", index + 1)?;
                }
            }
            Panel::Question => {
                if let Some(question) = &view.question {
                    writeln!(f, "{}\n{}", question.title, question.text)?;
                }
                writeln!(f, "Answer ({}):", view.word_count)?;
                if !view.answer.is_empty() {
                    writeln!(f, "  {}", view.answer)?;
                }
                write_mic(f, &view.mic)?;
            }
            Panel::Feedback => {
                writeln!(f, "Feedback")?;
                for section in &view.feedback {
                    write_section(f, section)?;
                }
                writeln!(f, "Type 'restart' to practice again.")?;
            }
        }

        if view.loading {
            writeln!(f, "(loading...)")?;
        }
        if let Some(notice) = &view.notice {
            let tag = match notice.kind {
                NoticeKind::Validation => "!",
                NoticeKind::Network => "error:",
                NoticeKind::Capability => "mic:",
            };
            writeln!(f, "{tag} {}", notice.message)?;
        }
        Ok(())
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, section: &FeedbackSection) -> fmt::Result {
    writeln!(f, "{}:", section.kind.heading())?;
    for item in &section.items {
        writeln!(f, "  - {item}")?;
    }
    Ok(())
}

fn write_mic(f: &mut fmt::Formatter<'_>, mic: &MicView) -> fmt::Result {
    if !mic.visible {
        return Ok(());
    }
    if mic.awaiting_permission {
        writeln!(f, "[mic] waiting for permission")
    } else if mic.recording {
        writeln!(
            f,
            "[mic] recording {}",
            mic.elapsed.as_deref().unwrap_or("00:00")
        )
    } else {
        writeln!(f, "[mic] off, type 'mic' to dictate")
    }
}

#[cfg(test)]
mod tests {
    use client_core::render::{FeedbackKind, NoticeView, QuestionView};

    use super::*;

    fn view(panel: Panel) -> View {
        View {
            panel,
            progress_step: panel.progress_step(),
            loading: false,
            notice: None,
            technologies: Vec::new(),
            question: None,
            answer: String::new(),
            word_count: "0 words".into(),
            mic: MicView {
                visible: false,
                recording: false,
                awaiting_permission: false,
                elapsed: None,
            },
            feedback: Vec::new(),
        }
    }

    fn tech_view() -> View {
        View {
            technologies: vec!["Python".into(), "FastAPI".into()],
            ..view(Panel::TechSelect)
        }
    }

    #[test]
    fn parses_navigation_commands() {
        let v = view(Panel::TypeSelect);
        assert_eq!(
            interpret("  HR ", &v),
            Ok(Input::Wizard(WizardEvent::ChooseType(InterviewType::Hr)))
        );
        assert_eq!(
            interpret("tech", &v),
            Ok(Input::Wizard(WizardEvent::ChooseType(
                InterviewType::Technical
            )))
        );
        assert_eq!(interpret("restart", &v), Ok(Input::Wizard(WizardEvent::Restart)));
        assert_eq!(interpret("quit", &v), Ok(Input::Quit));
        assert_eq!(interpret("   ", &v), Err(CommandError::Empty));
        assert_eq!(
            interpret("dance", &v),
            Err(CommandError::Unknown("dance".into()))
        );
    }

    #[test]
    fn type_keeps_inner_whitespace() {
        assert_eq!(
            interpret("type  I like  Rust ", &view(Panel::Question)),
            Ok(Input::Wizard(WizardEvent::EditAnswer("I like  Rust".into())))
        );
        assert_eq!(
            interpret("type", &view(Panel::Question)),
            Err(CommandError::MissingArgument("type"))
        );
    }

    #[test]
    fn pick_accepts_position_or_name() {
        let v = tech_view();
        assert_eq!(
            interpret("pick 2", &v),
            Ok(Input::Wizard(WizardEvent::ChooseTechnology("FastAPI".into())))
        );
        assert_eq!(
            interpret("pick python", &v),
            Ok(Input::Wizard(WizardEvent::ChooseTechnology("Python".into())))
        );
        assert_eq!(
            interpret("pick 0", &v),
            Err(CommandError::UnknownTechnology("0".into()))
        );
        assert_eq!(
            interpret("pick Go", &v),
            Err(CommandError::UnknownTechnology("Go".into()))
        );
    }

    #[test]
    fn draws_numbered_technologies() {
        let out = draw(&tech_view());
        assert!(out.starts_with("---- step 2/4 ----\n"));
        assert!(out.contains("  1. Python\n  2. FastAPI\n"));
    }

    #[test]
    fn draws_question_with_word_count_and_mic() {
        let out = draw(&View {
            question: Some(QuestionView {
                title: "HR Interview Question".into(),
                text: "Why us?".into(),
            }),
            answer: "Great team".into(),
            word_count: "2 words".into(),
            mic: MicView {
                visible: true,
                recording: true,
                awaiting_permission: false,
                elapsed: Some("00:07".into()),
            },
            ..view(Panel::Question)
        });
        assert!(out.contains("HR Interview Question\nWhy us?\n"));
        assert!(out.contains("Answer (2 words):\n  Great team\n"));
        assert!(out.contains("[mic] recording 00:07"));
    }

    #[test]
    fn draws_feedback_sections_and_notice() {
        let out = draw(&View {
            feedback: vec![FeedbackSection {
                kind: FeedbackKind::Weaknesses,
                items: vec!["Too short".into()],
            }],
            notice: Some(NoticeView {
                kind: NoticeKind::Network,
                message: "Failed to evaluate answer: HTTP error, status: 500".into(),
            }),
            ..view(Panel::Feedback)
        });
        assert!(out.contains("Areas for Improvement:\n  - Too short\n"));
        assert!(!out.contains("Strengths"));
        assert!(out.contains("error: Failed to evaluate answer: HTTP error, status: 500"));
    }

    #[test]
    fn draws_landing_and_every_mic_state() {
        assert_eq!(
            draw(&view(Panel::Landing)),
            "---- step 1/4 ----\nInterview practice\nType 'start' to begin.\n"
        );

        let hidden = draw(&view(Panel::Question));
        assert!(!hidden.contains("[mic]"));

        let mic = |awaiting_permission, recording| View {
            mic: MicView {
                visible: true,
                recording,
                awaiting_permission,
                elapsed: None,
            },
            loading: true,
            ..view(Panel::Question)
        };
        assert!(draw(&mic(true, false)).contains("[mic] waiting for permission\n(loading...)\n"));
        assert!(draw(&mic(false, true)).contains("[mic] recording 00:00\n"));
        assert!(draw(&mic(false, false)).contains("[mic] off, type 'mic' to dictate\n"));
    }
}
