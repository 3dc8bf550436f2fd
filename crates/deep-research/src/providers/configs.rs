pub const GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiProviderConfig {
    pub host: String,
    pub api_key: String,
}

impl GeminiProviderConfig {
    pub fn new(host: String, api_key: String) -> Self {
        Self { host, api_key }
    }

    pub fn with_default_host(api_key: String) -> Self {
        Self::new(GEMINI_HOST.to_string(), api_key)
    }
}
