use serde::Serialize;
use thiserror::Error;

use crate::models::interaction::{Interaction, InteractionHandle};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API key or insufficient permissions ({0})")]
    Unauthorized(u16),

    #[error("Server error: {0}")]
    Server(u16),

    #[error("Request failed: {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Body of an interaction-creation call.
#[derive(Debug, Clone, Serialize)]
pub struct NewInteraction<'a> {
    pub agent: &'a str,
    pub input: &'a str,
    pub background: bool,
}

/// Remote service that runs long-lived research interactions.
///
/// Work continues out-of-band after `create` returns; callers observe it
/// through repeated `get` calls.
pub trait InteractionProvider {
    fn create(&self, request: &NewInteraction<'_>) -> Result<Interaction, ProviderError>;

    fn get(&self, handle: &InteractionHandle) -> Result<Interaction, ProviderError>;
}
