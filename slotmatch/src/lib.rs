//! Rule-based slot extraction over part-of-speech tagged tokens.
//!
//! A sentence is tagged into [`Token`]s, each carrying its surface text, a
//! primary tag and a set of categories. An ordered [`RuleSet`] describes the
//! pattern to find: every [`Rule`] names a category, optionally a literal
//! text, and optionally a variable to capture into. [`match_rule`] returns one
//! populated rule set per left-to-right alignment of the rules over the
//! tokens.
//!
//! # Example
//!
//! ```rust
//! use slotmatch::{match_rule, parse_sentence, RuleSet, SlotValue};
//!
//! let tokens = parse_sentence("the check is 36 dollars");
//! let rules = RuleSet::parse(["check[noun]", "[number]->total", "[currency]->currency"]).unwrap();
//!
//! let matched = match_rule(&tokens, &rules).unwrap();
//! assert_eq!(matched.len(), 1);
//!
//! let slots = matched[0].bindings();
//! assert_eq!(slots["total"], SlotValue::Number(36.0));
//! assert_eq!(slots["currency"], SlotValue::from("dollars"));
//! ```

mod error;
mod lexicon;
mod matcher;
mod rule;
mod rules;
mod sequence;
mod token;

pub use error::{MatchError, Result};
pub use lexicon::{parse_sentence, Lexicon, LexiconTagger};
pub use matcher::{match_rule, match_rule_with, MatchOptions, MismatchPolicy, OverlapPolicy};
pub use rule::{Rule, RuleDef};
pub use rules::RuleSet;
pub use sequence::Sequence;
pub use token::{SlotValue, Tagger, Token, TokenSequence};
