use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::key_manager::KeyManagerError;
use crate::models::interaction::{InteractionHandle, InteractionStatus};
use crate::providers::base::ProviderError;

/// Everything that can end a research run.
///
/// Malformed narrative output is not among them. The narrative pipeline
/// recovers it and writes a fallback artifact.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error(transparent)]
    MissingCredential(#[from] KeyManagerError),

    #[error("Failed to submit research request: {0}")]
    Submission(#[source] ProviderError),

    #[error("Failed to query interaction {handle}: {source}")]
    StatusQuery {
        handle: InteractionHandle,
        #[source]
        source: ProviderError,
    },

    #[error("Research failed: {detail}")]
    Remote {
        handle: InteractionHandle,
        detail: String,
    },

    #[error(
        "Timeout after {:.0}s waiting for interaction {handle} (last status: {status})",
        .elapsed.as_secs_f64()
    )]
    Timeout {
        handle: InteractionHandle,
        status: InteractionStatus,
        elapsed: Duration,
    },

    #[error("Failed to render prompt: {0}")]
    Prompt(#[from] tera::Error),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize narrative: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type ResearchResult<T> = Result<T, ResearchError>;
