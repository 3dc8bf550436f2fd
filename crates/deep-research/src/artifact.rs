use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::errors::{ResearchError, ResearchResult};

pub const REPORT_FILE: &str = "research-gemini-deep.md";
pub const NARRATIVE_FILE: &str = "core-narrative-gemini.json";
pub const RAW_NARRATIVE_FILE: &str = "narrative-gemini-raw.txt";

/// Metadata printed above the report body.
#[derive(Debug, Clone)]
pub struct ReportMeta<'a> {
    pub topic: &'a str,
    pub agent: &'a str,
    pub generated_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl ReportMeta<'_> {
    pub fn header(&self) -> String {
        format!(
            "# Gemini Deep Research Report\n\n\
             **Topic:** {}\n\n\
             **Generated:** {}\n\n\
             **Time taken:** {:.1} seconds\n\n\
             **Method:** Gemini Deep Research API ({})\n\n\
             ---\n\n",
            self.topic,
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.elapsed.as_secs_f64(),
            self.agent,
        )
    }
}

pub fn ensure_output_dir(dir: &Path) -> ResearchResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
    }
    Ok(())
}

/// Writes the header followed by `report`, byte for byte.
pub fn write_report(dir: &Path, meta: &ReportMeta<'_>, report: &str) -> ResearchResult<PathBuf> {
    let path = dir.join(REPORT_FILE);
    let mut contents = meta.header();
    contents.push_str(report);
    write_file(&path, contents.as_bytes())?;
    Ok(path)
}

/// Pretty-prints with two-space indentation; non-ASCII text is written as-is.
pub fn write_narrative(dir: &Path, narrative: &Value) -> ResearchResult<PathBuf> {
    let path = dir.join(NARRATIVE_FILE);
    let contents = serde_json::to_string_pretty(narrative)?;
    write_file(&path, contents.as_bytes())?;
    Ok(path)
}

pub fn write_raw(dir: &Path, raw: &str) -> ResearchResult<PathBuf> {
    let path = dir.join(RAW_NARRATIVE_FILE);
    write_file(&path, raw.as_bytes())?;
    Ok(path)
}

fn write_file(path: &Path, contents: &[u8]) -> ResearchResult<()> {
    if let Some(parent) = path.parent() {
        ensure_output_dir(parent)?;
    }
    let mut file = File::create(path).map_err(|source| io_error(path, source))?;
    file.write_all(contents)
        .and_then(|_| file.flush())
        .map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> ResearchError {
    ResearchError::Io {
        path: path.to_path_buf(),
        source,
    }
}
