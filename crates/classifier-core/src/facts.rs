//! Fact Trees and Fact Paths
//!
//! A node reports its facts as an arbitrarily nested JSON tree. A fact
//! path addresses one value inside that tree using `.` for map descent
//! and `[n]` for sequence indexing, e.g. `os.release.major` or
//! `mountpoints[0].device`. Resolution never fails: a path that does not
//! lead to a value yields `None`, which the rule evaluator treats as a
//! first-class "absent" result.

use crate::error::ModelError;
use serde_json::Value;
use std::fmt;

/// One step of a parsed fact path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Descend into a map by key
    Key(String),
    /// Index into a sequence
    Index(usize),
}

/// Parsed, validated fact path.
///
/// The original string form is retained for display and serialization;
/// equality is defined over the parsed segments.
#[derive(Debug, Clone)]
pub struct FactPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FactPath {
    /// Parse a path string like `os.family` or `disks[1].size_bytes`.
    ///
    /// Total over arbitrary input: malformed paths return
    /// `ModelError::InvalidFactPath`, never panic.
    pub fn parse(path: &str) -> Result<Self, ModelError> {
        let invalid = |reason: &str| ModelError::InvalidFactPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if path.is_empty() {
            return Err(invalid("empty path"));
        }

        let mut segments = Vec::new();
        let mut chars = path.chars().peekable();

        loop {
            // Map-key segment
            let mut key = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' || c == '[' {
                    break;
                }
                if c == ']' {
                    return Err(invalid("unexpected ']'"));
                }
                key.push(c);
                chars.next();
            }
            if key.is_empty() {
                return Err(invalid("empty segment"));
            }
            segments.push(PathSegment::Key(key));

            // Zero or more [n] index suffixes
            while chars.peek() == Some(&'[') {
                chars.next();
                let mut digits = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ']' {
                        break;
                    }
                    digits.push(c);
                    chars.next();
                }
                if chars.next() != Some(']') {
                    return Err(invalid("unclosed '['"));
                }
                if digits.is_empty() {
                    return Err(invalid("empty index"));
                }
                let index: usize = digits
                    .parse()
                    .map_err(|_| invalid("index is not a non-negative integer"))?;
                segments.push(PathSegment::Index(index));
            }

            match chars.next() {
                None => break,
                Some('.') => {
                    if chars.peek().is_none() {
                        return Err(invalid("trailing '.'"));
                    }
                }
                Some(c) => {
                    return Err(invalid(&format!("unexpected character '{}' after ']'", c)));
                }
            }
        }

        Ok(FactPath {
            raw: path.to_string(),
            segments,
        })
    }

    /// Resolve this path against a fact tree.
    ///
    /// Returns `None` ("absent") when any segment is missing, an index is
    /// out of range, or a non-terminal segment lands on a scalar.
    pub fn resolve<'a>(&self, facts: &'a Value) -> Option<&'a Value> {
        let mut current = facts;
        for segment in &self.segments {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// The original path string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl PartialEq for FactPath {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for FactPath {}

impl fmt::Display for FactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl serde::Serialize for FactPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> serde::Deserialize<'de> for FactPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        FactPath::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Coerce a fact value to a number, if possible.
///
/// JSON numbers coerce directly; strings coerce when they parse as a
/// float. Booleans, null, and structured values do not coerce.
pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce a fact value to text, if possible.
///
/// Strings, numbers, and booleans are string-coercible; null and
/// structured values are not.
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_dotted_path() {
        let path = FactPath::parse("os.release.major").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("os".to_string()),
                PathSegment::Key("release".to_string()),
                PathSegment::Key("major".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_indexed_path() {
        let path = FactPath::parse("mountpoints[0].device").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("mountpoints".to_string()),
                PathSegment::Index(0),
                PathSegment::Key("device".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_repeated_indexes() {
        let path = FactPath::parse("matrix[2][3]").unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.segments()[2], PathSegment::Index(3));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(FactPath::parse("").is_err());
        assert!(FactPath::parse(".os").is_err());
        assert!(FactPath::parse("os.").is_err());
        assert!(FactPath::parse("os..family").is_err());
        assert!(FactPath::parse("disks[").is_err());
        assert!(FactPath::parse("disks[]").is_err());
        assert!(FactPath::parse("disks[x]").is_err());
        assert!(FactPath::parse("disks[0]x").is_err());
        assert!(FactPath::parse("disks]0[").is_err());
    }

    #[test]
    fn test_resolve_present() {
        let facts = json!({"os": {"family": "RedHat", "release": {"major": "9"}}});
        let path = FactPath::parse("os.release.major").unwrap();
        assert_eq!(path.resolve(&facts), Some(&json!("9")));
    }

    #[test]
    fn test_resolve_index() {
        let facts = json!({"mountpoints": [{"device": "/dev/sda1"}, {"device": "/dev/sdb1"}]});
        let path = FactPath::parse("mountpoints[1].device").unwrap();
        assert_eq!(path.resolve(&facts), Some(&json!("/dev/sdb1")));
    }

    #[test]
    fn test_resolve_absent() {
        let facts = json!({"os": {"family": "RedHat"}, "cpus": 4});
        assert!(FactPath::parse("os.release.major")
            .unwrap()
            .resolve(&facts)
            .is_none());
        assert!(FactPath::parse("kernel").unwrap().resolve(&facts).is_none());
        // Descent through a scalar
        assert!(FactPath::parse("cpus.count")
            .unwrap()
            .resolve(&facts)
            .is_none());
        // Index out of range
        let facts = json!({"disks": ["sda"]});
        assert!(FactPath::parse("disks[1]").unwrap().resolve(&facts).is_none());
        // Index into a map
        assert!(FactPath::parse("disks[0][0]")
            .unwrap()
            .resolve(&facts)
            .is_none());
    }

    #[test]
    fn test_path_equality_ignores_raw() {
        let a = FactPath::parse("os.family").unwrap();
        let b = FactPath::parse("os.family").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_round_trip() {
        let path = FactPath::parse("mountpoints[0].device").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"mountpoints[0].device\"");
        let decoded: FactPath = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, path);
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(number_of(&json!(4)), Some(4.0));
        assert_eq!(number_of(&json!("4.5")), Some(4.5));
        assert_eq!(number_of(&json!(" 7 ")), Some(7.0));
        assert_eq!(number_of(&json!(true)), None);
        assert_eq!(number_of(&json!(null)), None);
        assert_eq!(number_of(&json!([1])), None);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(text_of(&json!("x86_64")), Some("x86_64".to_string()));
        assert_eq!(text_of(&json!(8)), Some("8".to_string()));
        assert_eq!(text_of(&json!(false)), Some("false".to_string()));
        assert_eq!(text_of(&json!(null)), None);
        assert_eq!(text_of(&json!({})), None);
    }
}
