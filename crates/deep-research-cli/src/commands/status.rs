use anyhow::Result;
use console::style;
use deep_research::errors::ResearchError;
use deep_research::models::interaction::{InteractionHandle, InteractionStatus};
use deep_research::providers::base::InteractionProvider;

use super::Context;

/// Single status query. Nothing is polled or saved.
pub fn execute(ctx: &Context, interaction_id: &str) -> Result<()> {
    let provider = ctx.provider()?;
    let handle = InteractionHandle::new(interaction_id);

    let interaction = provider
        .get(&handle)
        .map_err(|source| ResearchError::StatusQuery {
            handle: handle.clone(),
            source,
        })?;

    println!("Interaction ID: {}", style(&handle).cyan());
    println!("Status: {}", interaction.status);

    match interaction.status {
        InteractionStatus::Completed => {
            let chars = interaction.final_text().map_or(0, |text| text.chars().count());
            println!("{}", style("Completed").green().bold());
            println!("Output length: {} characters", chars);
            Ok(())
        }
        InteractionStatus::Failed => Err(ResearchError::Remote {
            detail: interaction.error_detail(),
            handle,
        }
        .into()),
        InteractionStatus::Pending(_) => {
            println!("{}", style("Still running, check again later").yellow());
            Ok(())
        }
    }
}
