use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use tracing::debug;

use super::base::{InteractionProvider, NewInteraction, ProviderError};
use super::configs::GeminiProviderConfig;
use crate::models::interaction::{Interaction, InteractionHandle, InteractionPayload};

const API_VERSION: &str = "v1beta";

/// Blocking client for the Gemini Interactions API.
pub struct GeminiProvider {
    client: Client,
    config: GeminiProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn interactions_url(&self) -> String {
        format!(
            "{}/{}/interactions",
            self.config.host.trim_end_matches('/'),
            API_VERSION
        )
    }

    fn parse(response: Response) -> Result<Interaction, ProviderError> {
        match response.status() {
            StatusCode::OK => {
                let body = response.text()?;
                let payload: InteractionPayload = serde_json::from_str(&body)
                    .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
                Ok(payload.into())
            }
            status if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
                Err(ProviderError::Unauthorized(status.as_u16()))
            }
            status if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() => {
                Err(ProviderError::Server(status.as_u16()))
            }
            status => {
                let message = response.text().unwrap_or_default();
                Err(ProviderError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

impl InteractionProvider for GeminiProvider {
    fn create(&self, request: &NewInteraction<'_>) -> Result<Interaction, ProviderError> {
        let url = self.interactions_url();
        debug!("POST {} (agent {})", url, request.agent);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.as_str())
            .json(request)
            .send()?;

        Self::parse(response)
    }

    fn get(&self, handle: &InteractionHandle) -> Result<Interaction, ProviderError> {
        let url = format!("{}/{}", self.interactions_url(), handle);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.config.api_key.as_str())
            .send()?;

        Self::parse(response)
    }
}
