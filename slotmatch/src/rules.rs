//! Ordered rule lists.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::rule::{Rule, RuleDef};
use crate::sequence::Sequence;
use crate::token::SlotValue;

/// An ordered list of rules. Order is the order in which the rules must be
/// satisfied against a token stream.
pub type RuleSet = Sequence<Rule>;

impl Sequence<Rule> {
    /// Build a rule set from definitions.
    pub fn from_defs<I>(defs: I) -> Self
    where
        I: IntoIterator<Item = RuleDef>,
    {
        defs.into_iter().map(Rule::from).collect()
    }

    /// Build a rule set from compact rule strings.
    ///
    /// # Errors
    /// Returns `MalformedRuleSyntax` for the first string that does not parse.
    pub fn parse<I, S>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        rules.into_iter().map(|s| Rule::parse(s.as_ref())).collect()
    }

    /// Definitional form of every rule, in order. Match results are left out.
    pub fn to_json(&self) -> Vec<RuleDef> {
        self.iter().map(Rule::def).collect()
    }

    /// Captured values keyed by variable name.
    ///
    /// Only matched rules with a variable contribute. When two rules share a
    /// variable the later one wins.
    pub fn bindings(&self) -> BTreeMap<String, SlotValue> {
        self.iter()
            .filter_map(|rule| match (&rule.variable, &rule.value) {
                (Some(name), Some(value)) => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Returns true when every rule carries a captured value.
    pub fn is_satisfied(&self) -> bool {
        !self.is_empty() && self.iter().all(Rule::is_matched)
    }

    /// Clear match state on every rule.
    pub fn reset(&mut self) {
        self.iter_mut().for_each(Rule::reset);
    }
}
