//! Rule file and lexicon loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use slotmatch::{Lexicon, RuleDef, RuleSet};

/// Rule file: one named rule set with optional tests.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleFile {
    pub name: String,
    pub rules: Vec<RuleDef>,
    #[serde(default)]
    pub tests: Vec<TestDef>,
}

impl RuleFile {
    /// The rules of this file as a rule set.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::from_defs(self.rules.iter().cloned())
    }
}

/// Test definition within a rule file.
#[derive(Debug, Clone, Deserialize)]
pub struct TestDef {
    pub input: String,
    /// Expected bindings of the first alignment, as display strings.
    #[serde(default)]
    pub args: HashMap<String, String>,
    /// Whether the input is expected to match at all.
    #[serde(default = "default_matched")]
    pub matched: bool,
}

fn default_matched() -> bool {
    true
}

/// Load every `.json`, `.yaml` and `.yml` rule file under `dir`, sorted by name.
pub fn load_rules_from_dir(dir: &Path) -> Result<Vec<RuleFile>> {
    let mut rule_files = Vec::new();

    for path in walkdir(dir)? {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        if ext != "json" && ext != "yaml" && ext != "yml" {
            continue;
        }

        let data = std::fs::read(&path)?;
        let rf: RuleFile = match ext {
            "json" => serde_json::from_slice(&data)
                .with_context(|| format!("parse {}", path.display()))?,
            _ => serde_yaml::from_slice(&data)
                .with_context(|| format!("parse {}", path.display()))?,
        };
        if rf.rules.is_empty() {
            anyhow::bail!("{}: rule file {:?} has no rules", path.display(), rf.name);
        }
        rule_files.push(rf);
    }

    rule_files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(rule_files)
}

/// Load an extra lexicon from a YAML file.
pub fn load_lexicon(path: &Path) -> Result<Lexicon> {
    let data = std::fs::read(path)?;
    Lexicon::from_yaml(&data).with_context(|| format!("load lexicon {}", path.display()))
}

/// Simple directory walk.
fn walkdir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    fn walk(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                walk(&path, paths)?;
            } else {
                paths.push(path);
            }
        }
        Ok(())
    }

    walk(dir, &mut paths)?;
    Ok(paths)
}
