//! Lenient deserializers for values that arrive through environment
//! variables, where everything starts life as a string.

use std::fmt;

use serde::Deserializer;
use serde::de::{self, SeqAccess, Visitor};

/// Parses the boolean spellings accepted in configuration.
///
/// ```
/// use pagewatch_cli::config::parse_bool;
///
/// assert_eq!(parse_bool(" Yes "), Some(true));
/// assert_eq!(parse_bool("off"), Some(false));
/// assert_eq!(parse_bool("maybe"), None);
/// ```
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a comma-separated list, trimming items and dropping empty ones.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

struct BoolVisitor;

impl Visitor<'_> for BoolVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean or one of 1/0, true/false, yes/no, y/n, on/off")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        match v {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
        }
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        match v {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        parse_bool(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// Deserializes a boolean from a bool, 0/1, or a textual spelling.
pub fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    deserializer.deserialize_any(BoolVisitor)
}

struct StringVisitor;

impl Visitor<'_> for StringVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }
}

/// Deserializes a string, accepting numbers and booleans as their text.
///
/// Environment values such as a run id of `9001` are parsed as numbers
/// before they reach the typed config.
pub fn string_like<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(StringVisitor)
}

struct ListVisitor;

impl<'de> Visitor<'de> for ListVisitor {
    type Value = Vec<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a list of strings or a comma-separated string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Vec<String>, E> {
        Ok(split_list(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Vec<String>, E> {
        Ok(vec![v.to_string()])
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Vec<String>, E> {
        Ok(vec![v.to_string()])
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Vec<String>, E> {
        Ok(vec![v.to_string()])
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Vec<String>, E> {
        Ok(vec![v.to_string()])
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<String>, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<serde_json::Value>()? {
            let item = match item {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => continue,
                other => other.to_string(),
            };
            if !item.trim().is_empty() {
                items.push(item);
            }
        }
        Ok(items)
    }
}

/// Deserializes a list from a sequence or a comma-separated string.
pub fn comma_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    deserializer.deserialize_any(ListVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Flagged {
        #[serde(default, deserialize_with = "lenient_bool")]
        flag: bool,
        #[serde(default, deserialize_with = "comma_list")]
        list: Vec<String>,
        #[serde(default, deserialize_with = "string_like")]
        text: String,
    }

    fn flagged(json: &str) -> Flagged {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_bool_spellings() {
        for truthy in ["1", "true", "TRUE", "yes", "y", "on", " On "] {
            assert_eq!(parse_bool(truthy), Some(true), "{truthy}");
        }
        for falsy in ["0", "false", "No", "n", "off"] {
            assert_eq!(parse_bool(falsy), Some(false), "{falsy}");
        }
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("enabled"), None);
    }

    #[test]
    fn test_lenient_bool_accepts_bools_ints_and_text() {
        assert!(flagged(r#"{"flag": true}"#).flag);
        assert!(flagged(r#"{"flag": 1}"#).flag);
        assert!(!flagged(r#"{"flag": "off"}"#).flag);
        assert!(serde_json::from_str::<Flagged>(r#"{"flag": 2}"#).is_err());
        assert!(serde_json::from_str::<Flagged>(r#"{"flag": "sometimes"}"#).is_err());
    }

    #[test]
    fn test_comma_list_from_string() {
        let p = flagged(r#"{"list": " adsbygoogle, ,ERR_BLOCKED_BY_CLIENT,"}"#);
        assert_eq!(p.list, ["adsbygoogle", "ERR_BLOCKED_BY_CLIENT"]);
    }

    #[test]
    fn test_comma_list_from_sequence_keeps_commas() {
        let p = flagged(r#"{"list": ["a, b", 42, ""]}"#);
        assert_eq!(p.list, ["a, b", "42"]);
    }

    #[test]
    fn test_string_like_accepts_numbers() {
        assert_eq!(flagged(r#"{"text": 9001}"#).text, "9001");
        assert_eq!(flagged(r#"{"text": "abc123"}"#).text, "abc123");
    }
}
