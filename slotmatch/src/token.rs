//! Tagged tokens and the values captured from them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::sequence::Sequence;

/// Value captured by a rule, or attached by the tagger to an entity token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlotValue {
    /// Numeric value, always floating point.
    Number(f64),
    /// Literal surface text.
    Text(String),
    /// Calendar date resolved by the tagger.
    Date(NaiveDate),
}

impl SlotValue {
    /// Returns the number, if this is a `Number`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SlotValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text, if this is a `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SlotValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the date, if this is a `Date`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            SlotValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Day of month (1-based) for dates.
    pub fn day(&self) -> Option<u32> {
        self.as_date().map(|d| d.day())
    }

    /// Zero-based month index for dates (January is 0).
    pub fn month0(&self) -> Option<u32> {
        self.as_date().map(|d| d.month0())
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // 36.0 prints as "36", 36.6 stays "36.6"
            SlotValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            SlotValue::Number(n) => write!(f, "{}", n),
            SlotValue::Text(s) => write!(f, "{}", s),
            SlotValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<f64> for SlotValue {
    fn from(n: f64) -> Self {
        SlotValue::Number(n)
    }
}

impl From<&str> for SlotValue {
    fn from(s: &str) -> Self {
        SlotValue::Text(s.to_string())
    }
}

impl From<String> for SlotValue {
    fn from(s: String) -> Self {
        SlotValue::Text(s)
    }
}

impl From<NaiveDate> for SlotValue {
    fn from(d: NaiveDate) -> Self {
        SlotValue::Date(d)
    }
}

/// One unit of a tagged sentence.
///
/// Tokens are built once by a [`Tagger`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// Surface form.
    pub text: String,

    /// Primary category label, e.g. "Noun" or "Determiner".
    pub tag: String,

    /// Every category the token belongs to. A word can be a noun and an
    /// adjective at the same time.
    pub categories: BTreeMap<String, bool>,

    /// Pre-resolved value for multi-word entities such as dates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<SlotValue>,
}

impl Token {
    /// Create a token whose only category is its primary tag.
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let mut categories = BTreeMap::new();
        categories.insert(tag.clone(), true);
        Self {
            text: text.into(),
            tag,
            categories,
            entity: None,
        }
    }

    /// Add a category flag.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into(), true);
        self
    }

    /// Attach a pre-resolved entity value.
    pub fn with_entity(mut self, value: impl Into<SlotValue>) -> Self {
        self.entity = Some(value.into());
        self
    }

    /// Reports whether the token belongs to `category`, ignoring case.
    ///
    /// The category map is consulted first, then the primary tag.
    pub fn is(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|(name, on)| *on && name.eq_ignore_ascii_case(category))
            || self.tag.eq_ignore_ascii_case(category)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.text, self.tag)
    }
}

/// A tagged sentence.
pub type TokenSequence = Sequence<Token>;

/// Turns raw text into tagged tokens.
///
/// Multi-word entities (dates, person names, email addresses) must arrive as a
/// single token carrying the matching category.
pub trait Tagger {
    fn tokenize(&self, text: &str) -> TokenSequence;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_categories() {
        let token = Token::new("blue", "Adjective").with_category("Noun");
        assert!(token.is("adjective"));
        assert!(token.is("NOUN"));
        assert!(!token.is("verb"));
    }

    #[test]
    fn test_token_false_flag_ignored() {
        let mut token = Token::new("run", "Verb");
        token.categories.insert("Noun".to_string(), false);
        assert!(!token.is("noun"));
        assert!(token.is("verb"));
    }

    #[test]
    fn test_slot_value_display() {
        assert_eq!(SlotValue::Number(36.0).to_string(), "36");
        assert_eq!(SlotValue::Number(36.6).to_string(), "36.6");
        assert_eq!(SlotValue::from("dollars").to_string(), "dollars");

        let date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let value = SlotValue::from(date);
        assert_eq!(value.to_string(), "2026-01-10");
        assert_eq!(value.day(), Some(10));
        assert_eq!(value.month0(), Some(0));
    }

    #[test]
    fn test_slot_value_accessors() {
        let number = SlotValue::from(36.6);
        assert_eq!(number.as_f64(), Some(36.6));
        assert_eq!(number.as_str(), None);
        assert_eq!(number.as_date(), None);

        let text = SlotValue::from("dollars");
        assert_eq!(text.as_str(), Some("dollars"));
        assert_eq!(text.as_f64(), None);
        assert_eq!(text.day(), None);
    }

    #[test]
    fn test_slot_value_json() {
        assert_eq!(serde_json::to_string(&SlotValue::Number(5.0)).unwrap(), "5.0");
        assert_eq!(serde_json::to_string(&SlotValue::from("$")).unwrap(), r#""$""#);
    }
}
