use anyhow::Result;
use console::style;
use deep_research::clock::SystemClock;
use deep_research::models::request::ResearchKind;
use deep_research::pipeline::{NarrativeOutcome, Researcher};

use super::{announce, finish_run, Context};
use crate::progress::ConsoleProgress;

/// Malformed output still exits successfully; the raw text is kept on disk.
pub fn execute(ctx: &Context, topic: &str) -> Result<()> {
    let provider = ctx.provider()?;
    let request = ctx.request(ResearchKind::Narrative, topic)?;
    announce("Starting Gemini Deep Research + Narrative...", &request);

    let clock = SystemClock;
    let researcher = Researcher::new(&provider, &clock, ctx.research.clone());
    let mut progress = ConsoleProgress::new();
    let result = researcher.run_narrative(&request, &mut progress);
    let outcome = finish_run(&mut progress, result)?;

    println!("{}", style("Research + Narrative completed!").green().bold());
    println!();

    match outcome {
        NarrativeOutcome::Saved {
            path,
            key_points,
            warnings,
            elapsed,
            ..
        } => {
            println!("Narrative saved to: {}", path.display());
            println!("Time taken: {:.1} seconds", elapsed.as_secs_f64());
            println!("Valid JSON with {} key points", key_points);
            if !warnings.is_empty() {
                println!();
                println!("{}", style("Schema warnings:").yellow());
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }
        }
        NarrativeOutcome::Fallback { path, error, .. } => {
            println!("{} {}", style("JSON parse error:").yellow(), error);
            println!("Saving raw output for inspection...");
            println!("Raw output saved to: {}", path.display());
        }
    }
    Ok(())
}
