//! Frontmatter parser - Extracts and validates a manuscript's metadata block
//!
//! A manuscript opens with a `---` line, a YAML mapping, and a closing `---`
//! line. The mapping must carry a `storyteller` object with `chapter_id`,
//! `title` and `order`; everything else passes through untouched.

use serde_yaml::Value;

use crate::domain::entities::FrontmatterData;

const DELIMITER: &str = "---";
const STORYTELLER_KEY: &str = "storyteller";

/// Checked in this order so the first reported field is deterministic
const REQUIRED_FIELDS: [&str; 3] = ["chapter_id", "title", "order"];

#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("No frontmatter found")]
    NoFrontmatter,
    #[error("Failed to parse frontmatter YAML: {0}")]
    YamlParse(#[source] serde_yaml::Error),
    #[error("Frontmatter is missing the '{STORYTELLER_KEY}' key")]
    MissingStorytellerKey,
    #[error("Missing required field: {field}")]
    MissingRequiredField { field: &'static str },
}

impl FrontmatterError {
    pub fn kind(&self) -> &'static str {
        match self {
            FrontmatterError::NoFrontmatter => "no_frontmatter",
            FrontmatterError::YamlParse(_) => "yaml_parse_error",
            FrontmatterError::MissingStorytellerKey => "missing_storyteller_key",
            FrontmatterError::MissingRequiredField { .. } => "missing_required_field",
        }
    }
}

/// A manuscript split into validated frontmatter and prose body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub frontmatter: FrontmatterData,
    pub body: String,
}

/// Parse only the frontmatter of a manuscript
pub fn parse(document: &str) -> Result<FrontmatterData, FrontmatterError> {
    parse_document(document).map(|parsed| parsed.frontmatter)
}

/// Parse a manuscript into frontmatter and body
pub fn parse_document(document: &str) -> Result<ParsedDocument, FrontmatterError> {
    let (yaml, body) = split_frontmatter(document).ok_or(FrontmatterError::NoFrontmatter)?;

    let root: Value = serde_yaml::from_str(yaml).map_err(FrontmatterError::YamlParse)?;

    let storyteller = root
        .as_mapping()
        .and_then(|mapping| mapping.get(STORYTELLER_KEY))
        .filter(|value| value.is_mapping())
        .ok_or(FrontmatterError::MissingStorytellerKey)?;

    for field in REQUIRED_FIELDS {
        if !storyteller.get(field).is_some_and(is_truthy) {
            return Err(FrontmatterError::MissingRequiredField { field });
        }
    }

    let frontmatter: FrontmatterData =
        serde_yaml::from_value(storyteller.clone()).map_err(FrontmatterError::YamlParse)?;

    Ok(ParsedDocument {
        frontmatter,
        body: body.to_string(),
    })
}

/// Split at the opening and closing delimiter lines
///
/// Returns the YAML text between them and the body after the closing line.
fn split_frontmatter(document: &str) -> Option<(&str, &str)> {
    let document = document.strip_prefix('\u{feff}').unwrap_or(document);

    let (first_line, rest) = match document.split_once('\n') {
        Some((line, rest)) => (line, rest),
        None => (document, ""),
    };
    if !is_delimiter(first_line) {
        return None;
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_delimiter(line) {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Presence test for required fields: null, false, "" and 0 count as absent
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "---\nstoryteller:\n  chapter_id: chapter01\n  title: \"旅の始まり\"\n  order: 1\n  characters: [hero]\n  settings: []\n  summary: 勇者が旅立つ\n  mood: hopeful\n---\n勇者は王都へ向かった。\n";

    #[test]
    fn test_parse_valid_document() {
        let parsed = parse_document(DOCUMENT).expect("document should parse");

        assert_eq!(parsed.frontmatter.chapter_id.as_str(), "chapter01");
        assert_eq!(parsed.frontmatter.title, "旅の始まり");
        assert_eq!(parsed.frontmatter.order, serde_yaml::Number::from(1));
        assert_eq!(parsed.frontmatter.declared_characters(), ["hero".to_string()]);
        assert_eq!(parsed.frontmatter.settings, Some(vec![]));
        assert_eq!(parsed.frontmatter.summary.as_deref(), Some("勇者が旅立つ"));
        assert_eq!(
            parsed.frontmatter.extra.get("mood"),
            Some(&Value::String("hopeful".to_string()))
        );
        assert_eq!(parsed.body, "勇者は王都へ向かった。\n");
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse(DOCUMENT).unwrap(), parse(DOCUMENT).unwrap());
    }

    #[test]
    fn test_no_frontmatter() {
        let err = parse("勇者は王都へ向かった。").unwrap_err();
        assert_eq!(err.kind(), "no_frontmatter");

        let err = parse("---\nstoryteller:\n  chapter_id: c1\n").unwrap_err();
        assert_eq!(err.kind(), "no_frontmatter");

        let err = parse("\n---\nstoryteller: {}\n---\n").unwrap_err();
        assert_eq!(err.kind(), "no_frontmatter");
    }

    #[test]
    fn test_crlf_delimiters() {
        let document = "---\r\nstoryteller:\r\n  chapter_id: c1\r\n  title: T\r\n  order: 2\r\n---\r\nbody";
        let parsed = parse_document(document).expect("CRLF document should parse");
        assert_eq!(parsed.frontmatter.order, serde_yaml::Number::from(2));
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_yaml_parse_error() {
        let err = parse("---\nstoryteller: [unclosed\n---\n").unwrap_err();
        assert_eq!(err.kind(), "yaml_parse_error");
        assert!(matches!(err, FrontmatterError::YamlParse(_)));
    }

    #[test]
    fn test_missing_storyteller_key() {
        let err = parse("---\ntitle: 旅の始まり\n---\n").unwrap_err();
        assert_eq!(err.kind(), "missing_storyteller_key");

        let err = parse("---\n---\nbody").unwrap_err();
        assert_eq!(err.kind(), "missing_storyteller_key");
    }

    #[test]
    fn test_required_fields_checked_in_order() {
        let err = parse("---\nstoryteller:\n  summary: x\n---\n").unwrap_err();
        assert!(matches!(
            err,
            FrontmatterError::MissingRequiredField { field: "chapter_id" }
        ));

        let err = parse("---\nstoryteller:\n  chapter_id: c1\n---\n").unwrap_err();
        assert!(matches!(
            err,
            FrontmatterError::MissingRequiredField { field: "title" }
        ));

        let err = parse("---\nstoryteller:\n  chapter_id: c1\n  title: T\n---\n").unwrap_err();
        assert!(matches!(
            err,
            FrontmatterError::MissingRequiredField { field: "order" }
        ));
    }

    #[test]
    fn test_falsy_values_count_as_missing() {
        let err = parse("---\nstoryteller:\n  chapter_id: \"\"\n  title: T\n  order: 1\n---\n")
            .unwrap_err();
        assert!(matches!(
            err,
            FrontmatterError::MissingRequiredField { field: "chapter_id" }
        ));

        let err = parse("---\nstoryteller:\n  chapter_id: c1\n  title: T\n  order: 0\n---\n")
            .unwrap_err();
        assert!(matches!(
            err,
            FrontmatterError::MissingRequiredField { field: "order" }
        ));

        let err = parse("---\nstoryteller:\n  chapter_id: c1\n  title: ~\n  order: 1\n---\n")
            .unwrap_err();
        assert!(matches!(
            err,
            FrontmatterError::MissingRequiredField { field: "title" }
        ));
    }

    #[test]
    fn test_fractional_and_negative_order() {
        let parsed = parse("---\nstoryteller:\n  chapter_id: c1\n  title: T\n  order: 1.5\n---\n")
            .expect("fractional order is a valid number");
        assert_eq!(parsed.order.as_f64(), Some(1.5));
        assert_eq!(parsed.order.to_string(), "1.5");

        let parsed = parse("---\nstoryteller:\n  chapter_id: c1\n  title: T\n  order: -1\n---\n")
            .expect("negative order is a valid number");
        assert_eq!(parsed.order, serde_yaml::Number::from(-1));
    }

    #[test]
    fn test_wrong_field_type_is_yaml_error() {
        let err = parse("---\nstoryteller:\n  chapter_id: c1\n  title: T\n  order: first\n---\n")
            .unwrap_err();
        assert_eq!(err.kind(), "yaml_parse_error");
    }
}
