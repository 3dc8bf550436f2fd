use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tera::{Context, Error as TeraError, Tera};

pub const DEEP_REPORT_PROMPT: &str = include_str!("prompts/deep_report.md");
pub const NARRATIVE_PROMPT: &str = include_str!("prompts/narrative.md");

const PROMPT_NAME: &str = "research_prompt";

/// Renders `template` without autoescaping, so quotes and braces in the
/// topic reach the agent untouched.
pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_template(PROMPT_NAME, template)?;
    tera.render(PROMPT_NAME, &Context::from_serialize(context_data)?)
}

pub fn load_prompt_file<T: Serialize>(
    template_file: impl Into<PathBuf>,
    context_data: &T,
) -> Result<String, TeraError> {
    let template_path = template_file.into();
    let template_content = fs::read_to_string(&template_path).map_err(|e| {
        TeraError::chain(
            format!("Failed to read template file {}", template_path.display()),
            e,
        )
    })?;
    load_prompt(&template_content, context_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_prompt() {
        let template = "TOPIC: {{ topic }} at {{ created_at }}";
        let mut context = HashMap::new();
        context.insert("topic".to_string(), "sqlite".to_string());
        context.insert("created_at".to_string(), "2026-01-01T00:00:00Z".to_string());

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "TOPIC: sqlite at 2026-01-01T00:00:00Z");
    }

    #[test]
    fn test_topic_is_not_escaped() {
        let mut context = HashMap::new();
        context.insert("topic".to_string(), r#"C++ "modules" <2026>"#.to_string());

        let result = load_prompt("{{ topic }}", &context).unwrap();
        assert_eq!(result, r#"C++ "modules" <2026>"#);
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let template = "TOPIC: {{ topic }} at {{ created_at }}";
        let mut context = HashMap::new();
        context.insert("topic".to_string(), "sqlite".to_string());
        let result = load_prompt(template, &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_prompt_file_missing_file() {
        let context: HashMap<String, String> = HashMap::new();
        let result = load_prompt_file("non_existent_template.md", &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_prompts_render() {
        let mut context = HashMap::new();
        context.insert("topic".to_string(), "io_uring".to_string());
        context.insert("created_at".to_string(), "2026-01-01T00:00:00Z".to_string());

        let report = load_prompt(DEEP_REPORT_PROMPT, &context).unwrap();
        assert!(report.contains("TOPIC: io_uring"));

        let narrative = load_prompt(NARRATIVE_PROMPT, &context).unwrap();
        assert!(narrative.contains("TOPIC: io_uring"));
        assert!(narrative.contains(r#""created_at": "2026-01-01T00:00:00Z""#));
        assert!(narrative.contains("Return ONLY the JSON object"));
    }
}
