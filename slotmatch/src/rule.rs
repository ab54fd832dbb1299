//! Rule types and the compact rule syntax.
//!
//! A rule is written either as a mapping (`{text?, type, variable?}`) or as a
//! string such as `check[noun]->myvariable`: optional literal text, a bracketed
//! category, and an optional `->variable` capture name.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MatchError, Result};
use crate::token::{SlotValue, Token};

/// `[literal]<[type]>[->variable]`, where a literal may not start or end with whitespace.
static RULE_SYNTAX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:[^\[\]\s](?:[^\[\]]*[^\[\]\s])?)?)\[([A-Za-z_][A-Za-z0-9_]*)\](?:->([A-Za-z_][A-Za-z0-9_]*))?$").unwrap()
});

/// Definitional part of a rule: what it looks for and where the value goes.
///
/// JSON/YAML supports:
/// - `"check[noun]->myvariable"` (compact syntax)
/// - `{text: "check", type: "noun", variable: "myvariable"}` (mapping, `text` and
///   `variable` optional)
///
/// Serialization always emits the mapping form with nulls for missing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleDef {
    /// Required literal surface form, `None` if any text is acceptable.
    pub text: Option<String>,

    /// Required category name.
    #[serde(rename = "type")]
    pub rule_type: String,

    /// Name under which the captured value is reported.
    pub variable: Option<String>,
}

impl RuleDef {
    /// Create a definition for the given category.
    pub fn new(rule_type: impl Into<String>) -> Self {
        Self {
            rule_type: rule_type.into(),
            ..Default::default()
        }
    }

    /// Require a literal surface form.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the capture variable.
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    /// Parse the compact rule syntax.
    ///
    /// # Errors
    /// Returns `MalformedRuleSyntax` if `s` does not follow the grammar.
    pub fn parse(s: &str) -> Result<Self> {
        let caps = RULE_SYNTAX
            .captures(s)
            .ok_or_else(|| MatchError::MalformedRuleSyntax(s.to_string()))?;

        let text = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let variable = caps.get(3).map(|m| m.as_str().to_string());

        Ok(Self {
            text,
            rule_type: caps[2].to_string(),
            variable,
        })
    }
}

impl FromStr for RuleDef {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.text.as_deref().unwrap_or(""), self.rule_type)?;
        if let Some(variable) = &self.variable {
            write!(f, "->{}", variable)?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for RuleDef {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, IgnoredAny, MapAccess, Visitor};

        struct RuleDefVisitor;

        impl<'de> Visitor<'de> for RuleDefVisitor {
            type Value = RuleDef;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a rule string like \"check[noun]->var\" or a {text, type, variable} map")
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: Error,
            {
                RuleDef::parse(v).map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut text = None;
                let mut rule_type = None;
                let mut variable = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "text" => text = map.next_value::<Option<String>>()?,
                        "type" => rule_type = Some(map.next_value::<String>()?),
                        "variable" => variable = map.next_value::<Option<String>>()?,
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                let rule_type = rule_type.ok_or_else(|| Error::missing_field("type"))?;
                if rule_type.is_empty() {
                    return Err(Error::invalid_value(
                        serde::de::Unexpected::Str(""),
                        &"a non-empty category name",
                    ));
                }

                Ok(RuleDef {
                    text,
                    rule_type,
                    variable,
                })
            }
        }

        deserializer.deserialize_any(RuleDefVisitor)
    }
}

/// Extracts the captured value from a token that already matched a rule.
type Extractor = fn(&str, &Token) -> Result<SlotValue>;

/// Per-category value extraction. Categories not listed capture the token text.
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("number", extract_number),
    ("currency", extract_text),
    ("email", extract_text),
    ("date", extract_entity),
    ("person", extract_text),
];

fn extractor_for(category: &str) -> Extractor {
    let category = category.to_lowercase();
    EXTRACTORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, f)| *f)
        .unwrap_or(extract_text)
}

fn extract_text(_category: &str, token: &Token) -> Result<SlotValue> {
    Ok(SlotValue::Text(token.text.clone()))
}

fn extract_number(category: &str, token: &Token) -> Result<SlotValue> {
    // f64 parsing accepts "NaN" and "inf"; those are not numbers a user typed.
    match token.text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(SlotValue::Number(n)),
        _ => Err(MatchError::TypeMismatch {
            category: category.to_string(),
            text: token.text.clone(),
        }),
    }
}

fn extract_entity(category: &str, token: &Token) -> Result<SlotValue> {
    token.entity.clone().ok_or_else(|| MatchError::TypeMismatch {
        category: category.to_string(),
        text: token.text.clone(),
    })
}

/// One matching constraint, plus the result of its last successful match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// Required literal surface form, `None` if any text is acceptable.
    pub text: Option<String>,

    /// Required category, compared case-insensitively.
    #[serde(rename = "type")]
    pub rule_type: String,

    /// Advisory capture name. Not used by matching.
    pub variable: Option<String>,

    /// Value captured by the last successful match.
    pub value: Option<SlotValue>,

    /// Tokens skipped between the previous rule's match and this one.
    pub distance: Option<usize>,
}

impl Rule {
    /// Create an unmatched rule for the given category.
    pub fn new(rule_type: impl Into<String>) -> Self {
        Self::from(RuleDef::new(rule_type))
    }

    /// Require a literal surface form.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the capture variable.
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    /// Parse the compact rule syntax, e.g. `check[noun]->myvariable`.
    ///
    /// # Errors
    /// Returns `MalformedRuleSyntax` if `s` does not follow the grammar.
    pub fn parse(s: &str) -> Result<Self> {
        RuleDef::parse(s).map(Self::from)
    }

    /// Returns the definitional fields of this rule.
    pub fn def(&self) -> RuleDef {
        RuleDef {
            text: self.text.clone(),
            rule_type: self.rule_type.clone(),
            variable: self.variable.clone(),
        }
    }

    /// Reports whether `token` satisfies the category and literal constraints.
    pub fn accepts(&self, token: &Token) -> bool {
        if !token.is(&self.rule_type) {
            return false;
        }
        match &self.text {
            Some(text) => token.text == *text,
            None => true,
        }
    }

    /// Match `token` and, on success, store the extracted value.
    ///
    /// Returns `Ok(false)` without touching the rule when the token does not
    /// fit.
    ///
    /// # Errors
    /// Returns `TypeMismatch` when the token fits but its text cannot be read as
    /// the value shape of the category (e.g. a non-numeric `number`).
    pub fn match_token(&mut self, token: &Token) -> Result<bool> {
        if !self.accepts(token) {
            return Ok(false);
        }
        let extract = extractor_for(&self.rule_type);
        self.value = Some(extract(&self.rule_type, token)?);
        Ok(true)
    }

    /// Returns true once a value has been captured.
    pub fn is_matched(&self) -> bool {
        self.value.is_some()
    }

    /// Clear match state.
    pub fn reset(&mut self) {
        self.value = None;
        self.distance = None;
    }
}

impl From<RuleDef> for Rule {
    fn from(def: RuleDef) -> Self {
        Self {
            text: def.text,
            rule_type: def.rule_type,
            variable: def.variable,
            value: None,
            distance: None,
        }
    }
}

impl FromStr for Rule {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.def())
    }
}
