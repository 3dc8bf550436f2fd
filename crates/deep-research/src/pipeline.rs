use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::artifact::{self, ReportMeta};
use crate::clock::Clock;
use crate::errors::{ResearchError, ResearchResult};
use crate::extract::{parse_narrative, ExtractError};
use crate::models::interaction::{Interaction, InteractionHandle};
use crate::models::request::{ResearchRequest, DEFAULT_AGENT};
use crate::narrative::{self, LintIssue};
use crate::poller::{PollOutcome, PollPolicy, Poller, Progress, NARRATIVE_BUDGET, POLL_INTERVAL, REPORT_BUDGET};
use crate::providers::base::{InteractionProvider, NewInteraction};

/// Report text used when a completed interaction carries no output.
pub const NO_OUTPUT: &str = "No output";

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchSettings {
    pub agent: String,
    pub output_dir: PathBuf,
    pub poll_interval: Duration,
    pub report_budget: Duration,
    pub narrative_budget: Duration,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            agent: DEFAULT_AGENT.to_string(),
            output_dir: PathBuf::from("output"),
            poll_interval: POLL_INTERVAL,
            report_budget: REPORT_BUDGET,
            narrative_budget: NARRATIVE_BUDGET,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub path: PathBuf,
    pub interaction: Interaction,
    pub chars: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum NarrativeOutcome {
    Saved {
        path: PathBuf,
        interaction: Interaction,
        key_points: usize,
        warnings: Vec<LintIssue>,
        elapsed: Duration,
    },
    /// The output did not parse; the raw text was kept for manual inspection.
    Fallback {
        path: PathBuf,
        interaction: Interaction,
        error: ExtractError,
        elapsed: Duration,
    },
}

/// Runs research jobs against an injected provider and clock.
pub struct Researcher<'a, P, C> {
    provider: &'a P,
    clock: &'a C,
    settings: ResearchSettings,
}

impl<'a, P: InteractionProvider, C: Clock> Researcher<'a, P, C> {
    pub fn new(provider: &'a P, clock: &'a C, settings: ResearchSettings) -> Self {
        Self {
            provider,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &ResearchSettings {
        &self.settings
    }

    /// Starts the interaction in background mode and returns immediately.
    pub fn submit(&self, request: &ResearchRequest) -> ResearchResult<InteractionHandle> {
        let interaction = self
            .provider
            .create(&NewInteraction {
                agent: request.agent(),
                input: request.prompt(),
                background: true,
            })
            .map_err(ResearchError::Submission)?;

        info!(
            "Submitted {:?} research on {:?} as interaction {}",
            request.kind(),
            request.topic(),
            interaction.handle
        );
        Ok(interaction.handle)
    }

    pub fn wait(
        &self,
        handle: &InteractionHandle,
        budget: Duration,
        progress: &mut dyn Progress,
    ) -> ResearchResult<PollOutcome> {
        let policy = PollPolicy::new(self.settings.poll_interval, budget);
        Poller::new(self.provider, self.clock, policy).wait(handle, progress)
    }

    fn research(
        &self,
        request: &ResearchRequest,
        budget: Duration,
        progress: &mut dyn Progress,
    ) -> ResearchResult<(Interaction, Duration)> {
        let started = self.clock.now();
        let handle = self.submit(request)?;
        progress.submitted(&handle);

        let interaction = self.wait(&handle, budget, progress)?.into_interaction()?;
        let elapsed = self.clock.now().duration_since(started);
        Ok((interaction, elapsed))
    }

    /// Pipeline A: save the final text as a markdown report.
    pub fn run_report(
        &self,
        request: &ResearchRequest,
        progress: &mut dyn Progress,
    ) -> ResearchResult<ReportArtifact> {
        let (interaction, elapsed) =
            self.research(request, self.settings.report_budget, progress)?;
        let report = interaction.final_text().unwrap_or(NO_OUTPUT);

        let meta = ReportMeta {
            topic: request.topic(),
            agent: request.agent(),
            generated_at: Utc::now(),
            elapsed,
        };
        let path = artifact::write_report(&self.settings.output_dir, &meta, report)?;
        let chars = report.chars().count();

        Ok(ReportArtifact {
            path,
            chars,
            elapsed,
            interaction,
        })
    }

    /// Pipeline B: parse the final text as a narrative record.
    ///
    /// Unparseable output is not an error; it lands in the raw fallback file.
    pub fn run_narrative(
        &self,
        request: &ResearchRequest,
        progress: &mut dyn Progress,
    ) -> ResearchResult<NarrativeOutcome> {
        let (interaction, elapsed) =
            self.research(request, self.settings.narrative_budget, progress)?;
        let raw = interaction.final_text().unwrap_or("");

        match parse_narrative(raw) {
            Ok(value) => {
                let path = artifact::write_narrative(&self.settings.output_dir, &value)?;
                let warnings = lint_with_logging(&value);
                Ok(NarrativeOutcome::Saved {
                    path,
                    key_points: narrative::key_point_count(&value),
                    warnings,
                    elapsed,
                    interaction,
                })
            }
            Err(error) => {
                warn!("Narrative output did not parse: {}", error);
                let path = artifact::write_raw(&self.settings.output_dir, raw)?;
                Ok(NarrativeOutcome::Fallback {
                    path,
                    error,
                    elapsed,
                    interaction,
                })
            }
        }
    }
}

fn lint_with_logging(value: &Value) -> Vec<LintIssue> {
    let issues = narrative::lint(value);
    for issue in &issues {
        warn!("Narrative schema: {}", issue);
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::request::ResearchKind;
    use crate::providers::mock::MockProvider;
    use chrono::TimeZone;
    use std::fs;

    const ID: &str = "int-100";

    fn settings(dir: &std::path::Path) -> ResearchSettings {
        ResearchSettings {
            output_dir: dir.to_path_buf(),
            ..ResearchSettings::default()
        }
    }

    fn request(kind: ResearchKind) -> ResearchRequest {
        ResearchRequest::new(
            kind,
            "Rust 2024 edition",
            DEFAULT_AGENT,
            Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_submit_sends_rendered_prompt() {
        let provider = MockProvider::new(ID, vec![Interaction::completed(ID, "x")]);
        let clock = ManualClock::new();
        let dir = tempfile::tempdir().unwrap();
        let researcher = Researcher::new(&provider, &clock, settings(dir.path()));

        let request = request(ResearchKind::Report);
        let handle = researcher.submit(&request).unwrap();

        assert_eq!(handle.as_str(), ID);
        assert_eq!(provider.submitted(), vec![request.prompt().to_string()]);
        assert_eq!(provider.queries(), 0);
    }

    #[test]
    fn test_report_elapsed_includes_polling() {
        let provider = MockProvider::new(
            ID,
            vec![
                Interaction::pending(ID),
                Interaction::pending(ID),
                Interaction::completed(ID, "# Report"),
            ],
        );
        let clock = ManualClock::new();
        let dir = tempfile::tempdir().unwrap();
        let researcher = Researcher::new(&provider, &clock, settings(dir.path()));

        let artifact = researcher
            .run_report(&request(ResearchKind::Report), &mut ())
            .unwrap();

        assert_eq!(artifact.elapsed, Duration::from_secs(20));
        assert_eq!(artifact.chars, "# Report".len());
        let written = fs::read_to_string(&artifact.path).unwrap();
        assert!(written.contains("**Time taken:** 20.0 seconds"));
        assert!(written.ends_with("---\n\n# Report"));
    }

    #[test]
    fn test_report_without_output_uses_sentinel() {
        let mut empty = Interaction::completed(ID, "");
        empty.outputs.clear();
        let provider = MockProvider::new(ID, vec![empty]);
        let clock = ManualClock::new();
        let dir = tempfile::tempdir().unwrap();
        let researcher = Researcher::new(&provider, &clock, settings(dir.path()));

        let artifact = researcher
            .run_report(&request(ResearchKind::Report), &mut ())
            .unwrap();

        assert_eq!(artifact.chars, NO_OUTPUT.len());
        assert!(fs::read_to_string(&artifact.path)
            .unwrap()
            .ends_with(NO_OUTPUT));
    }

    #[test]
    fn test_report_uses_report_budget() {
        let provider = MockProvider::new(ID, vec![Interaction::pending(ID)]);
        let clock = ManualClock::new();
        let dir = tempfile::tempdir().unwrap();
        let researcher = Researcher::new(&provider, &clock, settings(dir.path()));

        let err = researcher
            .run_report(&request(ResearchKind::Report), &mut ())
            .unwrap_err();

        assert!(matches!(err, ResearchError::Timeout { .. }));
        assert_eq!(clock.elapsed(), Duration::from_secs(910));
        assert!(!dir.path().join(artifact::REPORT_FILE).exists());
    }

    #[test]
    fn test_narrative_uses_narrative_budget() {
        let provider = MockProvider::new(ID, vec![Interaction::pending(ID)]);
        let clock = ManualClock::new();
        let dir = tempfile::tempdir().unwrap();
        let researcher = Researcher::new(&provider, &clock, settings(dir.path()));

        let err = researcher
            .run_narrative(&request(ResearchKind::Narrative), &mut ())
            .unwrap_err();

        assert!(matches!(err, ResearchError::Timeout { .. }));
        assert_eq!(clock.elapsed(), Duration::from_secs(1210));
    }

    #[test]
    fn test_narrative_saved_with_warnings() {
        let provider = MockProvider::new(
            ID,
            vec![Interaction::completed(
                ID,
                "```json\n{\"topic_id\": \"x\", \"key_points\": [\"a\", \"b\"]}\n```",
            )],
        );
        let clock = ManualClock::new();
        let dir = tempfile::tempdir().unwrap();
        let researcher = Researcher::new(&provider, &clock, settings(dir.path()));

        let outcome = researcher
            .run_narrative(&request(ResearchKind::Narrative), &mut ())
            .unwrap();

        match outcome {
            NarrativeOutcome::Saved {
                path,
                key_points,
                warnings,
                ..
            } => {
                assert_eq!(path, dir.path().join(artifact::NARRATIVE_FILE));
                assert_eq!(key_points, 2);
                assert!(warnings.iter().any(|w| w.path == "key_points"));
            }
            other => panic!("expected saved narrative, got {:?}", other),
        }
    }

    #[test]
    fn test_narrative_fallback_keeps_raw_text() {
        let raw = "Sorry, I could not produce JSON { broken";
        let provider = MockProvider::new(ID, vec![Interaction::completed(ID, raw)]);
        let clock = ManualClock::new();
        let dir = tempfile::tempdir().unwrap();
        let researcher = Researcher::new(&provider, &clock, settings(dir.path()));

        let outcome = researcher
            .run_narrative(&request(ResearchKind::Narrative), &mut ())
            .unwrap();

        match outcome {
            NarrativeOutcome::Fallback { path, .. } => {
                assert_eq!(path, dir.path().join(artifact::RAW_NARRATIVE_FILE));
                assert_eq!(fs::read_to_string(path).unwrap(), raw);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
        assert!(!dir.path().join(artifact::NARRATIVE_FILE).exists());
    }
}
