use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
#[cfg(test)]
use mockall::automock;
#[cfg(test)]
use mockall::predicate::*;

pub const DEFAULT_API_KEY_NAME: &str = "GEMINI_API_KEY";

#[derive(Error, Debug)]
pub enum KeyManagerError {
    #[error("{name} not found in the environment or in {}", .searched.display())]
    MissingKey { name: String, searched: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    EnvFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg_attr(test, automock)]
pub trait Environment {
    fn get_var(&self, key: &str) -> std::result::Result<String, env::VarError>;
}

pub struct RealEnvironment;

impl Environment for RealEnvironment {
    fn get_var(&self, key: &str) -> std::result::Result<String, env::VarError> {
        env::var(key)
    }
}

pub fn resolve_api_key_default(
    api_key_name: &str,
    env_file: &Path,
) -> Result<String, KeyManagerError> {
    resolve_api_key(api_key_name, env_file, &RealEnvironment)
}

/// Looks up `api_key_name` in the environment, then in `env_file`.
///
/// Empty values count as absent in both places.
pub fn resolve_api_key(
    api_key_name: &str,
    env_file: &Path,
    env: &impl Environment,
) -> Result<String, KeyManagerError> {
    if let Ok(value) = env.get_var(api_key_name) {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }

    debug!(
        "{} not set in environment, checking {}",
        api_key_name,
        env_file.display()
    );

    if env_file.exists() {
        let contents = fs::read_to_string(env_file).map_err(|source| {
            KeyManagerError::EnvFileRead {
                path: env_file.to_path_buf(),
                source,
            }
        })?;
        if let Some(value) = find_assignment(&contents, api_key_name) {
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }

    Err(KeyManagerError::MissingKey {
        name: api_key_name.to_string(),
        searched: env_file.to_path_buf(),
    })
}

/// First `KEY=value` line for `key`, value trimmed.
fn find_assignment(contents: &str, key: &str) -> Option<String> {
    let prefix = format!("{}=", key);
    contents
        .lines()
        .find_map(|line| line.strip_prefix(&prefix))
        .map(|value| value.trim().to_string())
}
