use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use console::style;
use deep_research::artifact::NARRATIVE_FILE;
use deep_research::narrative::{self, Narrative};
use serde_json::Value;

use super::Context;

pub fn execute(ctx: &Context, file: Option<&Path>) -> Result<()> {
    let path = target(ctx, file);
    println!("Validating: {}", path.display());
    println!();

    let value = load(&path)?;
    let issues = narrative::lint(&value);
    if !issues.is_empty() {
        println!("{}", style("Core Narrative validation FAILED").red().bold());
        println!();
        println!("Errors:");
        for issue in &issues {
            println!("  - {}", issue);
        }
        println!();
        bail!("{} validation issue(s) in {}", issues.len(), path.display());
    }

    println!("{}", style("Core Narrative validation PASSED").green().bold());
    println!();
    println!("Summary:");
    for line in summary(&Narrative::from_value(&value)) {
        println!("  - {}", line);
    }
    Ok(())
}

fn target(ctx: &Context, file: Option<&Path>) -> PathBuf {
    match file {
        Some(file) => ctx.resolve(file),
        None => ctx.research.output_dir.join(NARRATIVE_FILE),
    }
}

fn load(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("File not found: {}", path.display()))?;
    serde_json::from_str(&content).context("Invalid JSON format")
}

fn summary(narrative: &Narrative) -> Vec<String> {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    vec![
        format!("Topic ID: {}", text(&narrative.topic_id)),
        format!("Title: {}", text(&narrative.title)),
        format!("Key Points: {}", narrative.key_points.len()),
        format!("FAQ Items: {}", narrative.faq.len()),
        format!("References: {}", narrative.references.len()),
        format!("Diagrams: {}", narrative.diagrams.len()),
        format!("Is Update: {}", narrative.is_update.unwrap_or(false)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().starts_with("File not found"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrative.json");
        fs::write(&path, "{\"topic_id\": ").unwrap();

        let err = load(&path).unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON format");
    }

    #[test]
    fn test_summary_counts_sections() {
        let value = json!({
            "topic_id": "rust-in-android",
            "key_points": ["a", "b", "c"],
            "faq": [{"question": "q", "answer": "a"}],
            "is_update": true
        });

        let lines = summary(&Narrative::from_value(&value));
        assert_eq!(lines[0], "Topic ID: rust-in-android");
        assert_eq!(lines[1], "Title: -");
        assert_eq!(lines[2], "Key Points: 3");
        assert_eq!(lines[3], "FAQ Items: 1");
        assert_eq!(lines[6], "Is Update: true");
    }
}
