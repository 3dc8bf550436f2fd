use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::prompt_template::{load_prompt, load_prompt_file, DEEP_REPORT_PROMPT, NARRATIVE_PROMPT};

pub const DEFAULT_AGENT: &str = "deep-research-pro-preview-12-2025";

/// Which pipeline a request feeds, and with it which built-in prompt applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchKind {
    Report,
    Narrative,
}

impl ResearchKind {
    fn builtin_template(&self) -> &'static str {
        match self {
            ResearchKind::Report => DEEP_REPORT_PROMPT,
            ResearchKind::Narrative => NARRATIVE_PROMPT,
        }
    }
}

#[derive(Serialize)]
struct PromptContext<'a> {
    topic: &'a str,
    created_at: String,
}

/// A fully rendered research request. Built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchRequest {
    topic: String,
    prompt: String,
    agent: String,
    kind: ResearchKind,
    created_at: DateTime<Utc>,
}

impl ResearchRequest {
    pub fn new<S: Into<String>, A: Into<String>>(
        kind: ResearchKind,
        topic: S,
        agent: A,
        created_at: DateTime<Utc>,
    ) -> Result<Self, tera::Error> {
        Self::render(kind, topic.into(), agent.into(), created_at, kind.builtin_template())
    }

    /// Same as [`ResearchRequest::new`] but renders a template read from disk.
    pub fn with_template_file<S: Into<String>, A: Into<String>>(
        kind: ResearchKind,
        topic: S,
        agent: A,
        created_at: DateTime<Utc>,
        template_file: &Path,
    ) -> Result<Self, tera::Error> {
        let topic = topic.into();
        let prompt = load_prompt_file(template_file, &Self::context(&topic, created_at))?;
        Ok(Self {
            topic,
            prompt,
            agent: agent.into(),
            kind,
            created_at,
        })
    }

    fn render(
        kind: ResearchKind,
        topic: String,
        agent: String,
        created_at: DateTime<Utc>,
        template: &str,
    ) -> Result<Self, tera::Error> {
        let prompt = load_prompt(template, &Self::context(&topic, created_at))?;
        Ok(Self {
            topic,
            prompt,
            agent,
            kind,
            created_at,
        })
    }

    fn context(topic: &str, created_at: DateTime<Utc>) -> PromptContext<'_> {
        PromptContext {
            topic,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn kind(&self) -> ResearchKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
