use std::{fmt, str::FromStr, time::Duration};

pub const FULL_API_BASE: &str = "http://127.0.0.1:8001";
pub const REDUCED_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(5);
pub const DEFAULT_SPEECH_LANG: &str = "en-US";

/// Feature profile of the wizard.
///
/// `Full` has a landing screen and voice capture. `Reduced` starts directly on
/// type selection and never offers the microphone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Full,
    Reduced,
}

impl Profile {
    pub fn default_api_base(self) -> &'static str {
        match self {
            Self::Full => FULL_API_BASE,
            Self::Reduced => REDUCED_API_BASE,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Reduced => f.write_str("reduced"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "reduced" | "basic" => Ok(Self::Reduced),
            other => Err(format!("unknown profile '{other}' (expected full or reduced)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    pub landing: bool,
    /// Restart returns to the landing screen instead of type selection.
    /// Has no effect without `landing`.
    pub restart_to_landing: bool,
    pub voice: bool,
    pub notice_duration: Duration,
    pub speech_lang: String,
}

impl WizardConfig {
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Full => Self::default(),
            Profile::Reduced => Self {
                landing: false,
                voice: false,
                ..Self::default()
            },
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            landing: true,
            restart_to_landing: false,
            voice: true,
            notice_duration: DEFAULT_NOTICE_DURATION,
            speech_lang: DEFAULT_SPEECH_LANG.to_string(),
        }
    }
}
