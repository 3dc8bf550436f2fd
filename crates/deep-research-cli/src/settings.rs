use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use deep_research::key_manager::DEFAULT_API_KEY_NAME;
use deep_research::models::request::DEFAULT_AGENT;
use deep_research::pipeline::ResearchSettings;
use deep_research::poller::{NARRATIVE_BUDGET, POLL_INTERVAL, REPORT_BUDGET};
use deep_research::providers::configs::GEMINI_HOST;
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "deep-research.toml";
const ENV_PREFIX: &str = "DEEP_RESEARCH";

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub host: String,
    pub agent: String,
    /// Name of the variable holding the API key, not the key itself.
    pub api_key_env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    pub interval_secs: u64,
    pub report_budget_secs: u64,
    pub narrative_budget_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub gemini: GeminiSettings,
    pub poll: PollSettings,
    pub output: OutputSettings,
}

impl Settings {
    /// Defaults, then `<project_dir>/deep-research.toml`, then `DEEP_RESEARCH__*`.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("gemini.host", GEMINI_HOST)?
            .set_default("gemini.agent", DEFAULT_AGENT)?
            .set_default("gemini.api_key_env", DEFAULT_API_KEY_NAME)?
            .set_default("poll.interval_secs", POLL_INTERVAL.as_secs() as i64)?
            .set_default("poll.report_budget_secs", REPORT_BUDGET.as_secs() as i64)?
            .set_default("poll.narrative_budget_secs", NARRATIVE_BUDGET.as_secs() as i64)?
            .set_default("output.dir", "output")?
            .add_source(File::from(project_dir.join(SETTINGS_FILE)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = config.try_deserialize()?;
        if settings.poll.interval_secs == 0 {
            return Err(ConfigError::Message(
                "poll.interval_secs must be at least 1".to_string(),
            ));
        }
        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Pipeline settings with the output directory anchored at `project_dir`.
    pub fn research_settings(&self, project_dir: &Path) -> ResearchSettings {
        ResearchSettings {
            agent: self.gemini.agent.clone(),
            output_dir: project_dir.join(&self.output.dir),
            poll_interval: Duration::from_secs(self.poll.interval_secs),
            report_budget: Duration::from_secs(self.poll.report_budget_secs),
            narrative_budget: Duration::from_secs(self.poll.narrative_budget_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("DEEP_RESEARCH__") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.gemini.host, GEMINI_HOST);
        assert_eq!(settings.gemini.agent, DEFAULT_AGENT);
        assert_eq!(settings.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(settings.poll.interval_secs, 10);
        assert_eq!(settings.poll.report_budget_secs, 900);
        assert_eq!(settings.poll.narrative_budget_secs, 1200);

        let research = settings.research_settings(dir.path());
        assert_eq!(research.output_dir, dir.path().join("output"));
        assert_eq!(research.narrative_budget, Duration::from_secs(1200));
    }

    #[test]
    #[serial]
    fn test_settings_file_overrides_defaults() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "[poll]\ninterval_secs = 2\n\n[output]\ndir = \"reports\"\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.poll.interval_secs, 2);
        assert_eq!(settings.poll.report_budget_secs, 900);
        assert_eq!(
            settings.research_settings(dir.path()).output_dir,
            dir.path().join("reports")
        );
    }

    #[test]
    #[serial]
    fn test_environment_overrides_settings_file() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "[poll]\ninterval_secs = 2\n\n[gemini]\nagent = \"from-file\"\n",
        )
        .unwrap();
        env::set_var("DEEP_RESEARCH__POLL__INTERVAL_SECS", "5");
        env::set_var("DEEP_RESEARCH__GEMINI__HOST", "http://localhost:9999");

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.poll.interval_secs, 5);
        assert_eq!(settings.gemini.host, "http://localhost:9999");
        assert_eq!(settings.gemini.agent, "from-file");

        env::remove_var("DEEP_RESEARCH__POLL__INTERVAL_SECS");
        env::remove_var("DEEP_RESEARCH__GEMINI__HOST");
    }

    #[test]
    #[serial]
    fn test_zero_poll_interval_is_rejected() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "[poll]\ninterval_secs = 0\n").unwrap();

        let err = Settings::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("poll.interval_secs must be at least 1"));
    }

    #[test]
    #[serial]
    fn test_invalid_number_is_rejected() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        env::set_var("DEEP_RESEARCH__POLL__REPORT_BUDGET_SECS", "soon");

        assert!(Settings::load(dir.path()).is_err());

        env::remove_var("DEEP_RESEARCH__POLL__REPORT_BUDGET_SECS");
    }
}
