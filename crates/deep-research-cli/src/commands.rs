use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::{Local, SecondsFormat, Utc};
use console::style;
use deep_research::errors::ResearchError;
use deep_research::key_manager::resolve_api_key_default;
use deep_research::models::request::{ResearchKind, ResearchRequest};
use deep_research::pipeline::ResearchSettings;
use deep_research::providers::configs::GeminiProviderConfig;
use deep_research::providers::gemini::GeminiProvider;

use crate::progress::ConsoleProgress;
use crate::settings::Settings;

pub mod narrative;
pub mod report;
pub mod status;
pub mod validate;
pub mod version;

const ENV_FILE: &str = ".env";

/// Values given on the command line. They win over every settings layer.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub agent: Option<String>,
    pub poll_interval: Option<u64>,
    pub timeout: Option<u64>,
    pub prompt_file: Option<PathBuf>,
}

pub struct Context {
    pub project_dir: PathBuf,
    pub settings: Settings,
    pub research: ResearchSettings,
    api_key: Option<String>,
    prompt_file: Option<PathBuf>,
}

impl Context {
    pub fn new(project_dir: PathBuf, overrides: Overrides) -> Result<Self> {
        let settings = Settings::load(&project_dir).with_context(|| {
            format!("Failed to load settings from {}", project_dir.display())
        })?;

        let mut research = settings.research_settings(&project_dir);
        if let Some(agent) = overrides.agent {
            research.agent = agent;
        }
        if let Some(secs) = overrides.poll_interval {
            research.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = overrides.timeout {
            research.report_budget = Duration::from_secs(secs);
            research.narrative_budget = Duration::from_secs(secs);
        }

        Ok(Self {
            project_dir,
            settings,
            research,
            api_key: overrides.api_key.filter(|key| !key.trim().is_empty()),
            prompt_file: overrides.prompt_file,
        })
    }

    pub fn env_file(&self) -> PathBuf {
        self.project_dir.join(ENV_FILE)
    }

    pub fn api_key(&self) -> Result<String, ResearchError> {
        match &self.api_key {
            Some(key) => Ok(key.clone()),
            None => Ok(resolve_api_key_default(
                &self.settings.gemini.api_key_env,
                &self.env_file(),
            )?),
        }
    }

    pub fn provider(&self) -> Result<GeminiProvider> {
        let config = GeminiProviderConfig::new(self.settings.gemini.host.clone(), self.api_key()?);
        GeminiProvider::new(config).context("Failed to create the Gemini client")
    }

    pub fn request(&self, kind: ResearchKind, topic: &str) -> Result<ResearchRequest> {
        let created_at = Utc::now();
        let agent = self.research.agent.as_str();
        let request = match &self.prompt_file {
            Some(path) => ResearchRequest::with_template_file(kind, topic, agent, created_at, path)
                .with_context(|| format!("Failed to render prompt from {}", path.display()))?,
            None => ResearchRequest::new(kind, topic, agent, created_at)
                .context("Failed to render the built-in prompt")?,
        };
        Ok(request)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.project_dir.join(path)
    }
}

/// Header printed before a research run starts.
pub fn announce(title: &str, request: &ResearchRequest) {
    println!("{}", style(title).bold());
    println!("Topic: {}", style(request.topic()).cyan());
    println!(
        "Started: {}",
        Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
    );
    println!();
}

/// Closes the progress line and adds the follow-up hint a timeout needs.
pub fn finish_run<T>(
    progress: &mut ConsoleProgress,
    result: Result<T, ResearchError>,
) -> Result<T> {
    progress.finish();
    result.map_err(|err| {
        if let ResearchError::Timeout { handle, .. } = &err {
            eprintln!(
                "{}",
                style(format!(
                    "The interaction keeps running remotely. Check it later with `deep-research status {}`",
                    handle
                ))
                .yellow()
            );
        }
        anyhow::Error::new(err)
    })
}
