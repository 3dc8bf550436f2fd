use anyhow::{anyhow, Result};
use bat::PrettyPrinter;
use console::style;
use deep_research::clock::SystemClock;
use deep_research::models::request::ResearchKind;
use deep_research::pipeline::Researcher;

use super::{announce, finish_run, Context};
use crate::progress::ConsoleProgress;

pub fn execute(ctx: &Context, topic: &str, print: bool) -> Result<()> {
    let provider = ctx.provider()?;
    let request = ctx.request(ResearchKind::Report, topic)?;
    announce("Starting Gemini Deep Research...", &request);

    let clock = SystemClock;
    let researcher = Researcher::new(&provider, &clock, ctx.research.clone());
    let mut progress = ConsoleProgress::new();
    let result = researcher.run_report(&request, &mut progress);
    let artifact = finish_run(&mut progress, result)?;

    println!("{}", style("Research completed!").green().bold());
    println!();
    println!("Report saved to: {}", artifact.path.display());
    println!("Time taken: {:.1} seconds", artifact.elapsed.as_secs_f64());
    println!("Report length: {} characters", artifact.chars);

    if print {
        println!();
        PrettyPrinter::new()
            .input_file(&artifact.path)
            .language("markdown")
            .print()
            .map_err(|err| anyhow!("Failed to render {}: {}", artifact.path.display(), err))?;
    }
    Ok(())
}
