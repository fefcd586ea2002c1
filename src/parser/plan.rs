//! Parsing of the structure planner's response.
//!
//! The planner is asked for a fenced ```json payload containing a file list
//! and a description map. The payload is validated against a JSON Schema
//! before being turned into a `ProjectPlan`.

use crate::error::WorkflowError;
use crate::models::ProjectPlan;
use jsonschema::Validator;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
struct PlanPayload {
    files: Vec<String>,
    descriptions: BTreeMap<String, String>,
}

const PLAN_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["files", "descriptions"],
    "properties": {
        "files": {
            "type": "array",
            "items": { "type": "string" }
        },
        "descriptions": {
            "type": "object",
            "additionalProperties": { "type": "string" }
        }
    }
}"#;

fn plan_validator() -> &'static Validator {
    static VALIDATOR: OnceLock<Validator> = OnceLock::new();
    VALIDATOR.get_or_init(|| {
        let schema = serde_json::from_str(PLAN_SCHEMA).expect("plan schema is valid JSON");
        Validator::new(&schema).expect("plan schema compiles")
    })
}

/// Extract and validate the structured payload from a planner response.
///
/// Accepts a fenced ```json block anywhere in the response, or a response
/// that is nothing but the JSON object. Anything else is a
/// `PlanningParseError` and the workflow must not proceed to scaffolding.
pub fn parse_plan(response: &str) -> Result<ProjectPlan, WorkflowError> {
    let raw = extract_json_payload(response)
        .ok_or_else(|| WorkflowError::planning("no fenced JSON block in response"))?;

    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| WorkflowError::planning(format!("payload is not valid JSON: {}", e)))?;

    if let Some(error) = plan_validator().iter_errors(&value).next() {
        return Err(WorkflowError::planning(format!(
            "payload failed schema validation: {}",
            error
        )));
    }

    let payload: PlanPayload = serde_json::from_value(value)
        .map_err(|e| WorkflowError::planning(format!("payload shape mismatch: {}", e)))?;

    let plan = ProjectPlan::new(payload.files, payload.descriptions);
    if plan.is_empty() {
        return Err(WorkflowError::planning("planner returned an empty file list"));
    }

    Ok(plan)
}

/// Pull the JSON text out of the response: fenced block first, then the
/// whole response if it already starts as a JSON object.
fn extract_json_payload(response: &str) -> Option<String> {
    let fence = Regex::new(r"(?s)```json\s+(.*?)\s*```").expect("valid regex");
    if let Some(captures) = fence.captures(response) {
        return Some(captures[1].to_string());
    }

    let trimmed = response.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_RESPONSE: &str = r#"Here is the project structure:
```json
{
    "files": ["main.py", "models/user.py"],
    "descriptions": {
        "main.py": "FastAPI entrypoint",
        "models/user.py": "User model with id and email"
    }
}
```
"#;

    #[test]
    fn test_parses_fenced_payload() {
        let plan = parse_plan(GOOD_RESPONSE).unwrap();
        assert_eq!(plan.files(), &["main.py", "models/user.py"]);
        assert_eq!(plan.description("main.py"), Some("FastAPI entrypoint"));
    }

    #[test]
    fn test_parses_bare_json_response() {
        let response = r#"{"files": ["a.py"], "descriptions": {"a.py": "x"}}"#;
        let plan = parse_plan(response).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_missing_payload_is_planning_error() {
        let err = parse_plan("I could not produce a structure, sorry.").unwrap_err();
        assert!(matches!(err, WorkflowError::PlanningParse { .. }));
    }

    #[test]
    fn test_malformed_json_is_planning_error() {
        let err = parse_plan("```json\n{\"files\": [}\n```").unwrap_err();
        assert!(matches!(err, WorkflowError::PlanningParse { .. }));
    }

    #[test]
    fn test_schema_rejects_non_string_entries() {
        let err = parse_plan("```json\n{\"files\": [1, 2], \"descriptions\": {}}\n```")
            .unwrap_err();
        assert!(matches!(err, WorkflowError::PlanningParse { .. }));
    }

    #[test]
    fn test_empty_file_list_rejected() {
        let err = parse_plan("```json\n{\"files\": [], \"descriptions\": {}}\n```").unwrap_err();
        assert!(matches!(err, WorkflowError::PlanningParse { .. }));
    }

    #[test]
    fn test_duplicates_deduplicated_first_wins() {
        let response = r#"```json
{
    "files": ["a.py", "a.py", "b.py"],
    "descriptions": {"a.py": "first", "b.py": "second"}
}
```"#;
        let plan = parse_plan(response).unwrap();
        assert_eq!(plan.files(), &["a.py", "b.py"]);
    }
}
