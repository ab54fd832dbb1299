//! Runs rule file tests and builds the report.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use slotmatch::{match_rule_with, MatchOptions, RuleSet, Tagger};

use crate::config::{RuleFile, TestDef};

/// Observed outcome of one input (JSON-friendly).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub matched: bool,
    #[serde(default)]
    pub args: HashMap<String, String>,
}

/// Result of running one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub rule: String,
    pub input: String,
    pub expected: Outcome,
    pub actual: Outcome,
    /// Number of alignments found.
    pub alignments: usize,
    pub duration_us: i64,
    pub status: String, // "pass", "fail", "error"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full test report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub rule_count: usize,
    pub test_count: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub cases: Vec<CaseResult>,
}

impl Report {
    pub fn pass_rate(&self) -> f64 {
        if self.test_count == 0 {
            return 0.0;
        }
        self.passed as f64 * 100.0 / self.test_count as f64
    }
}

/// Run the tests of every rule file.
pub fn run(files: &[RuleFile], tagger: &dyn Tagger, opts: &MatchOptions) -> Report {
    let mut report = Report {
        timestamp: Utc::now().to_rfc3339(),
        rule_count: files.len(),
        ..Default::default()
    };

    for rf in files {
        let rules = rf.rule_set();
        for tc in &rf.tests {
            let result = run_case(&rf.name, &rules, tc, tagger, opts);
            match result.status.as_str() {
                "pass" => report.passed += 1,
                "fail" => report.failed += 1,
                _ => report.errors += 1,
            }
            report.cases.push(result);
        }
    }

    report.test_count = report.cases.len();
    report
}

fn run_case(
    name: &str,
    rules: &RuleSet,
    tc: &TestDef,
    tagger: &dyn Tagger,
    opts: &MatchOptions,
) -> CaseResult {
    let start = Instant::now();
    let expected = Outcome {
        matched: tc.matched,
        args: tc.args.clone(),
    };

    let tokens = tagger.tokenize(&tc.input);
    let (actual, alignments, error) = match match_rule_with(&tokens, rules, opts) {
        Ok(matched) => (outcome(&matched), matched.len(), None),
        Err(e) => (Outcome::default(), 0, Some(e.to_string())),
    };

    let status = if error.is_some() {
        "error"
    } else if compare(&expected, &actual) {
        "pass"
    } else {
        "fail"
    };

    tracing::debug!(rule = name, input = %tc.input, status, "slotmatch: case done");

    CaseResult {
        rule: name.to_string(),
        input: tc.input.clone(),
        expected,
        actual,
        alignments,
        duration_us: start.elapsed().as_micros() as i64,
        status: status.to_string(),
        error,
    }
}

/// Outcome of the first alignment.
pub fn outcome(matched: &[RuleSet]) -> Outcome {
    match matched.first() {
        Some(rules) => Outcome {
            matched: true,
            args: rules
                .bindings()
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect(),
        },
        None => Outcome::default(),
    }
}

/// Compare expected outcome with actual outcome.
///
/// Every expected arg must be present with the same value; extra actual args
/// are allowed.
fn compare(expected: &Outcome, actual: &Outcome) -> bool {
    if expected.matched != actual.matched {
        return false;
    }
    expected
        .args
        .iter()
        .all(|(k, v)| actual.args.get(k) == Some(v))
}

/// Save report to file.
pub fn save_report(report: &Report, path: &Path) -> Result<()> {
    let data = serde_json::to_string_pretty(report)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// Print test summary.
pub fn print_summary(report: &Report) {
    println!("\n{}", "=".repeat(80));
    println!("TEST SUMMARY");
    println!("{}", "=".repeat(80));

    for case in report.cases.iter().filter(|c| c.status != "pass") {
        println!("[{}] {}: {:?}", case.status.to_uppercase(), case.rule, case.input);
        println!("    expected: {:?}", case.expected);
        println!("    actual:   {:?}", case.actual);
        if let Some(err) = &case.error {
            println!("    error:    {}", err);
        }
    }

    println!(
        "\n{:>8} {:>8} {:>8} {:>8} {:>10}",
        "Total", "Passed", "Failed", "Errors", "PassRate"
    );
    println!("{}", "-".repeat(80));
    println!(
        "{:>8} {:>8} {:>8} {:>8} {:>9.1}%",
        report.test_count,
        report.passed,
        report.failed,
        report.errors,
        report.pass_rate()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmatch::{Lexicon, LexiconTagger, MismatchPolicy, RuleDef};

    fn restaurant() -> RuleFile {
        RuleFile {
            name: "restaurant".to_string(),
            rules: vec![
                RuleDef::new("noun").with_text("check"),
                RuleDef::new("number").with_variable("total"),
                RuleDef::new("currency").with_variable("currency"),
            ],
            tests: vec![
                TestDef {
                    input: "the check is 36.6 dollars".to_string(),
                    args: [
                        ("total".to_string(), "36.6".to_string()),
                        ("currency".to_string(), "dollars".to_string()),
                    ]
                    .into(),
                    matched: true,
                },
                TestDef {
                    input: "the check is 36 dollars".to_string(),
                    args: [("total".to_string(), "37".to_string())].into(),
                    matched: true,
                },
                TestDef {
                    input: "the bill is 36 dollars".to_string(),
                    args: HashMap::new(),
                    matched: false,
                },
            ],
        }
    }

    #[test]
    fn test_run() {
        let report = run(&[restaurant()], &LexiconTagger::default(), &MatchOptions::default());
        assert_eq!(report.rule_count, 1);
        assert_eq!(report.test_count, 3);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors, 0);

        assert_eq!(report.cases[0].status, "pass");
        assert_eq!(report.cases[0].actual.args["total"], "36.6");
        assert_eq!(report.cases[1].status, "fail");
        assert_eq!(report.cases[1].actual.args["total"], "36");
        assert_eq!(report.cases[2].status, "pass");
        assert_eq!(report.cases[2].alignments, 0);
    }

    #[test]
    fn test_run_reports_errors() {
        // "dozen" is tagged as a number but has no numeric text
        let extra = Lexicon::from_yaml(b"words:\n  dozen: [Value, Number]\n").unwrap();
        let tagger = LexiconTagger::with_extra(extra);
        let rf = RuleFile {
            name: "count".to_string(),
            rules: vec![RuleDef::new("verb").with_text("buy"), RuleDef::new("number")],
            tests: vec![TestDef {
                input: "buy a dozen or 12 eggs".to_string(),
                args: HashMap::new(),
                matched: true,
            }],
        };

        let report = run(&[rf.clone()], &tagger, &MatchOptions::default());
        assert_eq!(report.errors, 1);
        assert_eq!(report.cases[0].status, "error");
        assert!(report.cases[0].error.as_deref().unwrap().contains("dozen"));

        let opts = MatchOptions::new().with_mismatch_policy(MismatchPolicy::SkipToken);
        let report = run(&[rf], &tagger, &opts);
        assert_eq!(report.passed, 1);
    }

    #[test]
    fn test_shipped_rules_pass() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("rules");
        let files = crate::config::load_rules_from_dir(&dir).unwrap();
        assert_eq!(files.len(), 5);

        let report = run(&files, &LexiconTagger::default(), &MatchOptions::default());
        let failing: Vec<_> = report.cases.iter().filter(|c| c.status != "pass").collect();
        assert!(failing.is_empty(), "failing cases: {:?}", failing);
        assert_eq!(report.passed, report.test_count);
    }

    #[test]
    fn test_compare() {
        let expected = Outcome {
            matched: true,
            args: [("a".to_string(), "1".to_string())].into(),
        };
        let mut actual = expected.clone();
        actual.args.insert("b".to_string(), "2".to_string());
        assert!(compare(&expected, &actual));

        actual.args.insert("a".to_string(), "3".to_string());
        assert!(!compare(&expected, &actual));

        assert!(!compare(&expected, &Outcome::default()));
        assert!(compare(&Outcome::default(), &Outcome::default()));
    }

    #[test]
    fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = run(&[restaurant()], &LexiconTagger::default(), &MatchOptions::default());
        save_report(&report, &path).unwrap();

        let loaded: Report = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(loaded.test_count, 3);
        assert_eq!(loaded.cases[0].rule, "restaurant");
    }
}
