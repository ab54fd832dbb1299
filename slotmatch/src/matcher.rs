//! Alignment search of an ordered rule set over a token sequence.
//!
//! Every token where the first rule matches is an anchor. From each anchor the
//! rules are satisfied in order, each taking the first matching token at or
//! after the cursor, without backtracking. Each anchor that satisfies the
//! whole set yields one independent, fully populated clone of the rule set.

use tracing::{debug, trace, warn};

use crate::error::{MatchError, Result};
use crate::rule::Rule;
use crate::rules::RuleSet;
use crate::token::{Token, TokenSequence};

/// What to do when a token fits a rule but its value cannot be extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Fail the whole search with the `TypeMismatch` error.
    #[default]
    Abort,
    /// Treat the token as a non-match and keep scanning.
    SkipToken,
}

/// How alignments from different anchors may relate to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Every anchor that satisfies the set contributes a result.
    #[default]
    Keep,
    /// Skip anchors that fall inside the token span of an accepted alignment.
    Suppress,
}

/// Options for [`match_rule_with`].
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    pub on_type_mismatch: MismatchPolicy,
    pub overlap: OverlapPolicy,
    /// Stop after this many alignments.
    pub limit: Option<usize>,
}

impl MatchOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type mismatch policy.
    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.on_type_mismatch = policy;
        self
    }

    /// Set the overlap policy.
    pub fn with_overlap(mut self, policy: OverlapPolicy) -> Self {
        self.overlap = policy;
        self
    }

    /// Cap the number of alignments returned.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Find every alignment of `rules` over `tokens` with default options.
///
/// Results are ordered by anchor index. An unsatisfiable rule set yields an
/// empty vector.
///
/// # Errors
/// Returns `EmptyCollection` for an empty rule set and `TypeMismatch` when a
/// matching token cannot be converted to its category's value.
pub fn match_rule(tokens: &TokenSequence, rules: &RuleSet) -> Result<Vec<RuleSet>> {
    match_rule_with(tokens, rules, &MatchOptions::default())
}

/// Find every alignment of `rules` over `tokens`.
///
/// `rules` is never modified; each result is a clone carrying `value` and
/// `distance` on every rule.
pub fn match_rule_with(
    tokens: &TokenSequence,
    rules: &RuleSet,
    opts: &MatchOptions,
) -> Result<Vec<RuleSet>> {
    let first = rules.head()?;
    let mut results = Vec::new();
    // Last token index covered by an accepted alignment.
    let mut covered: Option<usize> = None;

    for (anchor, token) in tokens.iter().enumerate() {
        if opts.limit.is_some_and(|limit| results.len() >= limit) {
            break;
        }
        if !first.accepts(token) || !try_match(&mut first.clone(), token, opts)? {
            continue;
        }
        if opts.overlap == OverlapPolicy::Suppress && covered.is_some_and(|end| anchor <= end) {
            debug!(anchor, "slotmatch: anchor inside accepted alignment, skipped");
            continue;
        }

        match align(tokens, rules, anchor, opts)? {
            Some(alignment) => {
                debug!(anchor, end = alignment.end, "slotmatch: alignment satisfied");
                covered = Some(alignment.end);
                results.push(alignment.rules);
            }
            None => debug!(anchor, "slotmatch: alignment failed"),
        }
    }

    Ok(results)
}

/// A satisfied alignment pass.
struct Alignment {
    rules: RuleSet,
    /// Index of the token matched by the last rule.
    end: usize,
}

/// State of one alignment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Searching(usize),
    Satisfied,
    Failed,
}

/// Run one alignment pass starting at `anchor` on a fresh clone of `rules`.
fn align(
    tokens: &TokenSequence,
    rules: &RuleSet,
    anchor: usize,
    opts: &MatchOptions,
) -> Result<Option<Alignment>> {
    let mut working = rules.clone();
    working.reset();

    let mut cursor = anchor;
    let mut previous: Option<usize> = None;
    let mut state = Pass::Searching(0);

    loop {
        state = match state {
            Pass::Searching(r) if r == working.count() => Pass::Satisfied,
            Pass::Searching(r) => {
                let rule = working.at_mut(r)?;
                match find_from(tokens, rule, cursor, opts)? {
                    Some(i) => {
                        let distance = match previous {
                            Some(p) => i - p - 1,
                            None => i,
                        };
                        trace!(rule = r, token = i, distance, "slotmatch: rule matched");
                        rule.distance = Some(distance);
                        previous = Some(i);
                        cursor = i + 1;
                        Pass::Searching(r + 1)
                    }
                    None => Pass::Failed,
                }
            }
            Pass::Satisfied => {
                return Ok(Some(Alignment {
                    rules: working,
                    end: previous.unwrap_or(anchor),
                }));
            }
            Pass::Failed => return Ok(None),
        };
    }
}

/// Index of the first token at or after `start` that `rule` matches.
fn find_from(
    tokens: &TokenSequence,
    rule: &mut Rule,
    start: usize,
    opts: &MatchOptions,
) -> Result<Option<usize>> {
    for (i, token) in tokens.iter().enumerate().skip(start) {
        if try_match(rule, token, opts)? {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

/// Match one token, applying the type mismatch policy.
fn try_match(rule: &mut Rule, token: &Token, opts: &MatchOptions) -> Result<bool> {
    match rule.match_token(token) {
        Err(err @ MatchError::TypeMismatch { .. }) => match opts.on_type_mismatch {
            MismatchPolicy::Abort => Err(err),
            MismatchPolicy::SkipToken => {
                warn!(token = %token, "slotmatch: {}, token skipped", err);
                Ok(false)
            }
        },
        other => other,
    }
}
