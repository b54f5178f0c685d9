use std::{
    collections::HashMap,
    env, fs,
    io::ErrorKind,
    path::Path,
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::{config::DEFAULT_NOTICE_DURATION, Profile, WizardConfig};
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "interview.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub profile: Profile,
    /// Overrides the profile's default service address when set.
    pub api_base_url: Option<String>,
    pub notice_seconds: u64,
    pub speech_lang: String,
    pub restart_to_landing: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let wizard = WizardConfig::default();
        Self {
            profile: Profile::default(),
            api_base_url: None,
            notice_seconds: DEFAULT_NOTICE_DURATION.as_secs(),
            speech_lang: wizard.speech_lang,
            restart_to_landing: wizard.restart_to_landing,
        }
    }
}

impl Settings {
    pub fn apply_cli(&mut self, profile: Option<Profile>, api_base: Option<String>) {
        if let Some(profile) = profile {
            self.profile = profile;
        }
        if let Some(api_base) = api_base {
            self.api_base_url = Some(api_base);
        }
    }

    pub fn api_base_url(&self) -> anyhow::Result<String> {
        let raw = self
            .api_base_url
            .as_deref()
            .unwrap_or_else(|| self.profile.default_api_base());
        let url = Url::parse(raw.trim()).with_context(|| format!("invalid api base url '{raw}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api base url '{raw}' must use http or https");
        }
        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    pub fn wizard_config(&self) -> WizardConfig {
        WizardConfig {
            notice_duration: Duration::from_secs(self.notice_seconds),
            speech_lang: self.speech_lang.clone(),
            restart_to_landing: self.restart_to_landing,
            ..WizardConfig::for_profile(self.profile)
        }
    }
}

/// Defaults, then the config file, then `INTERVIEW_API_BASE` / `APP__*`
/// environment variables. A missing default file is not an error; a missing
/// explicit `--config` file is.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if config_path.is_none() && err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    if let Some(v) = file_cfg.get("profile") {
        settings.profile = v.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("notice_seconds") {
        settings.notice_seconds = v
            .parse()
            .with_context(|| format!("notice_seconds must be a whole number, got '{v}'"))?;
    }
    if let Some(v) = file_cfg.get("speech_lang") {
        settings.speech_lang = v.clone();
    }
    if let Some(v) = file_cfg.get("restart_to_landing") {
        settings.restart_to_landing = v
            .parse()
            .with_context(|| format!("restart_to_landing must be true or false, got '{v}'"))?;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = var("APP__PROFILE") {
        settings.profile = v.parse().map_err(anyhow::Error::msg)?;
    }

    if let Some(v) = var("INTERVIEW_API_BASE") {
        settings.api_base_url = Some(v);
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = Some(v);
    }

    if let Some(v) = var("APP__NOTICE_SECONDS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.notice_seconds = parsed,
            Err(_) => warn!(value = %v, "ignoring APP__NOTICE_SECONDS"),
        }
    }

    if let Some(v) = var("APP__SPEECH_LANG") {
        settings.speech_lang = v;
    }

    if let Some(v) = var("APP__RESTART_TO_LANDING") {
        match v.parse::<bool>() {
            Ok(parsed) => settings.restart_to_landing = parsed,
            Err(_) => warn!(value = %v, "ignoring APP__RESTART_TO_LANDING"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use client_core::config::{FULL_API_BASE, REDUCED_API_BASE};

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_follow_full_profile() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url().expect("url"), FULL_API_BASE);
        assert_eq!(settings.wizard_config(), WizardConfig::default());
    }

    #[test]
    fn reduced_profile_changes_address_and_features() {
        let mut settings = Settings::default();
        settings.apply_cli(Some(Profile::Reduced), None);

        assert_eq!(settings.api_base_url().expect("url"), REDUCED_API_BASE);
        let wizard = settings.wizard_config();
        assert!(!wizard.landing);
        assert!(!wizard.voice);
    }

    #[test]
    fn file_then_env_then_cli() {
        let mut settings = Settings::default();
        apply_file(
            &mut settings,
            r#"
profile = "reduced"
api_base_url = "http://file.local:9000"
notice_seconds = "3"
speech_lang = "en-GB"
restart_to_landing = "true"
"#,
        )
        .expect("file");
        assert_eq!(settings.profile, Profile::Reduced);
        assert_eq!(settings.notice_seconds, 3);
        assert!(settings.restart_to_landing);

        apply_env(
            &mut settings,
            vars(&[
                ("INTERVIEW_API_BASE", "http://legacy.local"),
                ("APP__API_BASE_URL", "http://env.local:7000/"),
                ("APP__SPEECH_LANG", "fr-FR"),
            ]),
        )
        .expect("env");
        assert_eq!(settings.api_base_url().expect("url"), "http://env.local:7000");
        assert_eq!(settings.speech_lang, "fr-FR");

        settings.apply_cli(None, Some("https://cli.local".into()));
        assert_eq!(settings.api_base_url().expect("url"), "https://cli.local");
        assert_eq!(
            settings.wizard_config().notice_duration,
            Duration::from_secs(3)
        );
    }

    #[test]
    fn unparsable_notice_seconds_from_env_is_ignored() {
        let mut settings = Settings::default();
        apply_env(&mut settings, vars(&[("APP__NOTICE_SECONDS", "soon")])).expect("env");
        assert_eq!(settings.notice_seconds, 5);
    }

    #[test]
    fn rejects_bad_profile_and_urls() {
        let mut settings = Settings::default();
        assert!(apply_file(&mut settings, "profile = \"deluxe\"").is_err());

        settings.api_base_url = Some("not a url".into());
        assert!(settings.api_base_url().is_err());

        settings.api_base_url = Some("ftp://127.0.0.1".into());
        assert!(settings.api_base_url().is_err());
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let missing = env::temp_dir().join(format!("interview_wizard_missing_{suffix}.toml"));
        assert!(load_settings(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_config_file_is_read() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("interview_wizard_{suffix}.toml"));
        fs::write(&path, "speech_lang = \"de-DE\"\n").expect("write config");

        let loaded = load_settings(Some(&path));
        fs::remove_file(&path).expect("cleanup");

        assert_eq!(loaded.expect("settings").speech_lang, "de-DE");
    }
}
