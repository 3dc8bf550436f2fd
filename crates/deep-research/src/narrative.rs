//! The narrative record the combined pipeline asks the agent to produce.
//!
//! The schema is a contract with the remote agent, not something this crate
//! enforces: [`Narrative`] is a lenient view used for summaries, and [`lint`]
//! reports deviations without rejecting the record.

use std::fmt;

use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

lazy_static! {
    static ref KEBAB_CASE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Narrative {
    pub topic_id: Option<String>,
    pub title: Option<String>,
    pub created_at: Option<String>,
    pub is_update: Option<bool>,
    pub previous_topic_id: Option<String>,
    pub one_liner: Option<String>,
    pub key_points: Vec<String>,
    pub story_spine: Option<StorySpine>,
    pub faq: Vec<FaqItem>,
    pub references: Vec<Reference>,
    pub diagrams: Vec<Diagram>,
    pub seo: Option<Seo>,
    pub localization: Option<Localization>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorySpine {
    pub background: String,
    pub breakthrough: String,
    pub mechanism: String,
    pub significance: String,
    pub risks: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    pub title: String,
    pub url: String,
    pub source: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagram {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seo {
    pub slug: String,
    pub meta_title_en: String,
    pub meta_description_en: String,
    pub keywords_en: Vec<String>,
    pub keywords_zh: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localization {
    pub zh_strategy: Option<String>,
    pub zh_hints: Option<String>,
}

impl Narrative {
    /// Typed view of `value`. Fields of the wrong shape fall back to empty.
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };

        Self {
            topic_id: string_field(fields.get("topic_id")),
            title: string_field(fields.get("title")),
            created_at: string_field(fields.get("created_at")),
            is_update: fields.get("is_update").and_then(Value::as_bool),
            previous_topic_id: string_field(fields.get("previous_topic_id")),
            one_liner: string_field(fields.get("one_liner")),
            key_points: lenient(fields.get("key_points")),
            story_spine: lenient(fields.get("story_spine")),
            faq: lenient(fields.get("faq")),
            references: lenient(fields.get("references")),
            diagrams: lenient(fields.get("diagrams")),
            seo: lenient(fields.get("seo")),
            localization: lenient(fields.get("localization")),
        }
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn lenient<T: for<'de> Deserialize<'de> + Default>(value: Option<&Value>) -> T {
    value
        .and_then(|v| T::deserialize(v).ok())
        .unwrap_or_default()
}

/// Number of entries under `key_points`, whatever their type.
pub fn key_point_count(value: &Value) -> usize {
    value
        .get("key_points")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    pub path: String,
    pub message: String,
}

impl LintIssue {
    fn new<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Checks a parsed narrative against the editorial schema.
pub fn lint(value: &Value) -> Vec<LintIssue> {
    if !value.is_object() {
        return vec![LintIssue::new("root", "narrative must be a JSON object")];
    }

    let narrative = Narrative::from_value(value);
    let mut issues = Vec::new();

    match narrative.topic_id.as_deref() {
        None | Some("") => issues.push(LintIssue::new("topic_id", "topic_id cannot be empty")),
        Some(id) if !KEBAB_CASE.is_match(id) => {
            issues.push(LintIssue::new("topic_id", "topic_id must be kebab-case"))
        }
        _ => {}
    }
    require_text(&mut issues, "title", narrative.title.as_deref());
    require_text(&mut issues, "one_liner", narrative.one_liner.as_deref());

    match narrative.created_at.as_deref() {
        Some(ts) if is_utc_timestamp(ts) => {}
        _ => issues.push(LintIssue::new(
            "created_at",
            "created_at must be ISO 8601 format",
        )),
    }

    if !value.get("is_update").is_some_and(Value::is_boolean) {
        issues.push(LintIssue::new("is_update", "is_update must be a boolean"));
    }
    match value.get("previous_topic_id") {
        Some(Value::String(_)) | Some(Value::Null) => {}
        _ => issues.push(LintIssue::new(
            "previous_topic_id",
            "previous_topic_id must be a string or null",
        )),
    }

    check_count(&mut issues, "key_points", narrative.key_points.len(), 3, Some(5));
    if narrative.key_points.iter().any(|point| point.trim().is_empty()) {
        issues.push(LintIssue::new("key_points", "key points cannot be empty"));
    }

    match &narrative.story_spine {
        Some(spine) => {
            for (part, text) in [
                ("background", &spine.background),
                ("breakthrough", &spine.breakthrough),
                ("mechanism", &spine.mechanism),
                ("significance", &spine.significance),
                ("risks", &spine.risks),
            ] {
                require_text(&mut issues, &format!("story_spine.{}", part), Some(text.as_str()));
            }
        }
        None => issues.push(LintIssue::new("story_spine", "story_spine is required")),
    }

    check_count(&mut issues, "faq", narrative.faq.len(), 3, None);
    for (i, item) in narrative.faq.iter().enumerate() {
        require_text(&mut issues, &format!("faq.{}.question", i), Some(item.question.as_str()));
        require_text(&mut issues, &format!("faq.{}.answer", i), Some(item.answer.as_str()));
    }

    check_count(&mut issues, "references", narrative.references.len(), 1, None);
    for (i, reference) in narrative.references.iter().enumerate() {
        require_text(&mut issues, &format!("references.{}.title", i), Some(reference.title.as_str()));
        require_text(&mut issues, &format!("references.{}.source", i), Some(reference.source.as_str()));
        if Url::parse(&reference.url).is_err() {
            issues.push(LintIssue::new(
                format!("references.{}.url", i),
                "Reference URL must be valid",
            ));
        }
        if NaiveDate::parse_from_str(&reference.date, "%Y-%m-%d").is_err() {
            issues.push(LintIssue::new(
                format!("references.{}.date", i),
                "Reference date must be YYYY-MM-DD",
            ));
        }
    }

    check_count(&mut issues, "diagrams", narrative.diagrams.len(), 1, None);
    for (i, diagram) in narrative.diagrams.iter().enumerate() {
        if diagram.kind != "mermaid" {
            issues.push(LintIssue::new(
                format!("diagrams.{}.type", i),
                "diagram type must be mermaid",
            ));
        }
        require_text(&mut issues, &format!("diagrams.{}.title", i), Some(diagram.title.as_str()));
        require_text(&mut issues, &format!("diagrams.{}.code", i), Some(diagram.code.as_str()));
    }

    match &narrative.seo {
        Some(seo) => lint_seo(&mut issues, seo),
        None => issues.push(LintIssue::new("seo", "seo is required")),
    }

    issues
}

fn lint_seo(issues: &mut Vec<LintIssue>, seo: &Seo) {
    if !KEBAB_CASE.is_match(&seo.slug) {
        issues.push(LintIssue::new("seo.slug", "SEO slug must be kebab-case"));
    }
    check_chars(issues, "seo.meta_title_en", &seo.meta_title_en, 50, 60);
    check_chars(issues, "seo.meta_description_en", &seo.meta_description_en, 150, 160);
    check_count(issues, "seo.keywords_en", seo.keywords_en.len(), 3, Some(5));
    check_count(issues, "seo.keywords_zh", seo.keywords_zh.len(), 3, Some(5));
    for (path, keywords) in [
        ("seo.keywords_en", &seo.keywords_en),
        ("seo.keywords_zh", &seo.keywords_zh),
    ] {
        if keywords.iter().any(String::is_empty) {
            issues.push(LintIssue::new(path, "keywords cannot be empty"));
        }
    }
}

/// RFC 3339 in UTC with a `Z` suffix; numeric offsets are rejected.
fn is_utc_timestamp(ts: &str) -> bool {
    ts.ends_with('Z') && DateTime::parse_from_rfc3339(ts).is_ok()
}

fn require_text(issues: &mut Vec<LintIssue>, path: &str, text: Option<&str>) {
    if text.map_or(true, |t| t.trim().is_empty()) {
        issues.push(LintIssue::new(path, format!("{} cannot be empty", path)));
    }
}

fn check_count(issues: &mut Vec<LintIssue>, path: &str, len: usize, min: usize, max: Option<usize>) {
    let in_range = len >= min && max.map_or(true, |max| len <= max);
    if !in_range {
        let expected = match max {
            Some(max) => format!("{}-{}", min, max),
            None => format!("at least {}", min),
        };
        issues.push(LintIssue::new(
            path,
            format!("{} must have {} items, found {}", path, expected, len),
        ));
    }
}

fn check_chars(issues: &mut Vec<LintIssue>, path: &str, text: &str, min: usize, max: usize) {
    let len = text.chars().count();
    if len < min || len > max {
        issues.push(LintIssue::new(
            path,
            format!("{} must be {}-{} characters, found {}", path, min, max, len),
        ));
    }
}
