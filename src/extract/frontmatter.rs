//! `---` delimited YAML front-matter

use crate::error::Result;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

/// Metadata read from a document's front-matter block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub info: Vec<String>,
    pub draft: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontMatter {
    title: Option<Value>,
    tags: Option<Value>,
    info: Option<Value>,
    draft: Option<Value>,
}

/// Split raw file text into `(front-matter, body)`.
///
/// The block must open on the first line with `---` and close with another
/// `---` line. Returns `None` when there is no complete block.
pub fn split(raw: &str) -> Option<(&str, &str)> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let opening = lines.next()?;
    if opening.trim_end() != "---" {
        return None;
    }

    let mut offset = opening.len();
    for line in lines {
        if line.trim_end() == "---" {
            let yaml = &text[opening.len()..offset];
            let body = &text[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }

    None
}

/// Parse raw file text into front-matter and body.
///
/// A file without a block yields empty metadata and the whole text as body.
/// A block that is not a key/value mapping is ignored the same way, with the
/// text after it as body.
pub fn parse(raw: &str) -> Result<(FrontMatter, &str)> {
    let Some((yaml, body)) = split(raw) else {
        return Ok((FrontMatter::default(), raw));
    };

    if yaml.trim().is_empty() {
        return Ok((FrontMatter::default(), body));
    }

    let value: Value = serde_yaml::from_str(yaml)?;
    let raw_matter = match value {
        Value::Null => RawFrontMatter::default(),
        Value::Mapping(map) => serde_yaml::from_value(Value::Mapping(map))?,
        other => {
            debug!(
                "Ignoring front-matter block: expected a mapping, found {}",
                value_kind(&other)
            );
            return Ok((FrontMatter::default(), body));
        }
    };

    let matter = FrontMatter {
        title: raw_matter
            .title
            .as_ref()
            .and_then(scalar_to_string)
            .filter(|t| !t.is_empty()),
        tags: string_list(raw_matter.tags.as_ref()),
        info: string_list(raw_matter.info.as_ref()),
        draft: matches!(raw_matter.draft, Some(Value::Bool(true))),
    };

    Ok((matter, body))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_front_matter() {
        let raw = "---\ntitle: Hooks\n---\n# Hooks\n";
        let (yaml, body) = split(raw).unwrap();
        assert_eq!(yaml, "title: Hooks\n");
        assert_eq!(body, "# Hooks\n");
    }

    #[test]
    fn test_split_handles_crlf() {
        let raw = "---\r\ntitle: Hooks\r\n---\r\nBody";
        let (yaml, body) = split(raw).unwrap();
        assert_eq!(yaml, "title: Hooks\r\n");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_requires_opening_line() {
        assert!(split("# Title\n---\nfoo: bar\n---\n").is_none());
        assert!(split("---\ntitle: never closed\n").is_none());
    }

    #[test]
    fn test_parse_full_front_matter() {
        let raw = "---\ntitle: React Hooks Guide\ntags: [react, hooks]\ninfo:\n  - https://react.dev\n  - \"[[Internal]]\"\ndraft: false\n---\n# React Hooks";
        let (matter, body) = parse(raw).unwrap();

        assert_eq!(matter.title.as_deref(), Some("React Hooks Guide"));
        assert_eq!(matter.tags, vec!["react", "hooks"]);
        assert_eq!(matter.info, vec!["https://react.dev", "[[Internal]]"]);
        assert!(!matter.draft);
        assert_eq!(body, "# React Hooks");
    }

    #[test]
    fn test_parse_without_front_matter() {
        let (matter, body) = parse("# Basic Guide\n\nContent...").unwrap();
        assert_eq!(matter, FrontMatter::default());
        assert_eq!(body, "# Basic Guide\n\nContent...");
    }

    #[test]
    fn test_parse_null_values() {
        let (matter, body) = parse("---\ntitle:\ntags:\n---\nContent").unwrap();
        assert!(matter.title.is_none());
        assert!(matter.tags.is_empty());
        assert_eq!(body, "Content");
    }

    #[test]
    fn test_parse_empty_block() {
        let (matter, body) = parse("---\n---\nContent").unwrap();
        assert_eq!(matter, FrontMatter::default());
        assert_eq!(body, "Content");
    }

    #[test]
    fn test_draft_must_be_boolean_true() {
        let (matter, _) = parse("---\ndraft: true\n---\n").unwrap();
        assert!(matter.draft);

        let (matter, _) = parse("---\ndraft: \"yes\"\n---\n").unwrap();
        assert!(!matter.draft);
    }

    #[test]
    fn test_parse_rejects_invalid_yaml() {
        assert!(parse("---\ntitle: [unclosed\n---\nBody").is_err());
    }

    #[test]
    fn test_non_mapping_block_is_ignored() {
        let (matter, body) = parse("---\n- just\n- a list\n---\nBody").unwrap();
        assert_eq!(matter, FrontMatter::default());
        assert_eq!(body, "Body");

        let (matter, body) = parse("---\nIntro paragraph\n---\n# Notes").unwrap();
        assert_eq!(matter, FrontMatter::default());
        assert_eq!(body, "# Notes");
    }
}
