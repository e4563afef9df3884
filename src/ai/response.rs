//! Parsing of model answers into generated tests

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

/// One test proposed by the model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTest {
    #[serde(default)]
    pub test_name: String,

    /// What the test checks, in prose
    #[serde(default)]
    pub test_behavior: String,

    /// Test code to insert into the test file
    #[serde(default)]
    pub test_code: String,

    /// Import lines the test needs
    #[serde(default, deserialize_with = "lenient_string")]
    pub new_imports_code: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub test_tags: String,
}

/// The whole answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuggestions {
    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub new_tests: Vec<GeneratedTest>,
}

/// Accept a string, a list of strings or null
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .filter_map(|item| match item {
                serde_yaml::Value::String(s) => Some(s.clone()),
                serde_yaml::Value::Number(n) => Some(n.to_string()),
                serde_yaml::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", "),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Body of the first fenced block, or the whole text when there is none
fn strip_fences(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after_open = &text[open + 3..];
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(after_open.len());
    let body = &after_open[body_start..];
    match body.find("\n```") {
        Some(close) => &body[..close + 1],
        None => body.strip_suffix("```").unwrap_or(body),
    }
}

/// Drop any prose before the first top-level answer key
fn skip_preamble(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with("language:") || line.starts_with("new_tests:") {
            return &text[offset..];
        }
        offset += line.len();
    }
    text
}

/// Parse a model answer
///
/// Unusable answers produce no tests rather than an error, so a cover run can
/// simply ask again.
pub fn parse_tests(answer: &str) -> TestSuggestions {
    let yaml = skip_preamble(strip_fences(answer));
    match serde_yaml::from_str::<TestSuggestions>(yaml) {
        Ok(mut suggestions) => {
            let before = suggestions.new_tests.len();
            suggestions
                .new_tests
                .retain(|test| !test.test_code.trim().is_empty());
            if suggestions.new_tests.len() < before {
                debug!(
                    "Dropped {} suggested tests without code",
                    before - suggestions.new_tests.len()
                );
            }
            suggestions
        }
        Err(e) => {
            warn!("Could not parse model answer as YAML: {}", e);
            TestSuggestions::default()
        }
    }
}
