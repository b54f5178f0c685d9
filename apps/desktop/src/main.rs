mod config;
mod terminal;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    HttpInterviewClient, Profile, UnavailableMicrophone, UnsupportedSpeechEngine,
    WizardController, WizardEvent,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::terminal::{CommandError, Input};

#[derive(Parser, Debug)]
#[command(name = "interview-wizard", about = "Practice HR and technical interview questions")]
struct Args {
    /// Base URL of the question/evaluation service.
    #[arg(long)]
    api_base: Option<String>,
    /// `full` (landing screen, voice input) or `reduced`.
    #[arg(long)]
    profile: Option<Profile>,
    /// Path to a TOML settings file (default `interview.toml`).
    #[arg(long)]
    config: Option<PathBuf>,
}

enum Step {
    Line(Option<String>),
    Event(Option<WizardEvent>),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    settings.apply_cli(args.profile, args.api_base);
    let api_base = settings.api_base_url()?;
    info!(%api_base, profile = %settings.profile, "starting interview wizard");

    let mut controller = WizardController::new(
        settings.wizard_config(),
        Arc::new(HttpInterviewClient::new(api_base)),
        Arc::new(UnavailableMicrophone),
        Box::new(UnsupportedSpeechEngine),
    );

    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut last_frame = String::new();
    show(&mut stdout, &controller, &mut last_frame).await?;

    loop {
        let step = tokio::select! {
            line = lines.next_line() => Step::Line(line.context("failed to read stdin")?),
            event = controller.next_event() => Step::Event(event),
        };

        match step {
            Step::Line(None) | Step::Event(None) => break,
            Step::Event(Some(event)) => controller.dispatch(event),
            Step::Line(Some(line)) => match terminal::interpret(&line, &controller.view()) {
                Ok(Input::Quit) => break,
                Ok(Input::Help) => {
                    write_out(&mut stdout, &format!("{}\n", terminal::HELP)).await?;
                }
                Ok(Input::Wizard(event)) => controller.dispatch(event),
                Err(CommandError::Empty) => {}
                Err(err) => {
                    warn!(input = %line.trim(), "unrecognised input");
                    write_out(&mut stdout, &format!("{err}\n")).await?;
                }
            },
        }

        show(&mut stdout, &controller, &mut last_frame).await?;
    }

    info!("bye");
    Ok(())
}

/// Prints the current view unless it is identical to the last one printed.
async fn show(stdout: &mut Stdout, controller: &WizardController, last_frame: &mut String) -> Result<()> {
    let frame = terminal::draw(&controller.view());
    if frame != *last_frame {
        write_out(stdout, &frame).await?;
        *last_frame = frame;
    }
    Ok(())
}

async fn write_out(stdout: &mut Stdout, text: &str) -> Result<()> {
    stdout
        .write_all(text.as_bytes())
        .await
        .context("failed to write to stdout")?;
    stdout.flush().await.context("failed to flush stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn every_flag_is_documented() {
        let command = Args::command();
        command.clone().debug_assert();
        for arg in command.get_arguments() {
            if matches!(arg.get_id().as_str(), "help" | "version") {
                continue;
            }
            assert!(arg.get_help().is_some(), "--{} has no help text", arg.get_id());
        }
    }

    #[test]
    fn parses_profile_and_config_flags() {
        let args = Args::try_parse_from([
            "interview-wizard",
            "--profile",
            "reduced",
            "--config",
            "custom.toml",
        ])
        .expect("args");
        assert_eq!(args.profile, Some(Profile::Reduced));
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(args.api_base, None);
    }
}
