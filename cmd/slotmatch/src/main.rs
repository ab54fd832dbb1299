//! slotmatch - Run slot rules against sentences.

mod config;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use slotmatch::{
    match_rule_with, LexiconTagger, MatchOptions, MismatchPolicy, OverlapPolicy, RuleSet, Tagger,
};
use tracing_subscriber::EnvFilter;

/// Run slot rules against sentences.
#[derive(Parser, Debug)]
#[command(name = "slotmatch")]
#[command(about = "Extract slots from sentences with ordered token rules")]
#[command(version)]
struct Args {
    /// Rules directory: run the tests of every rule file in it
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Sentence to match
    #[arg(short, long)]
    text: Option<String>,

    /// Rule in compact syntax, e.g. "check[noun]" or "[number]->total" (repeatable)
    #[arg(short, long = "rule")]
    rule: Vec<String>,

    /// Print the tokens of --text and exit
    #[arg(long)]
    tokens: bool,

    /// Extra lexicon YAML merged over the built-in one
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Year given to dates written without one
    #[arg(long)]
    year: Option<i32>,

    /// Treat tokens whose value cannot be read as non-matches instead of failing
    #[arg(long)]
    skip_mismatch: bool,

    /// Drop alignments starting inside an earlier alignment
    #[arg(long)]
    suppress_overlap: bool,

    /// Return at most this many alignments
    #[arg(long)]
    limit: Option<usize>,

    /// Output JSON report to file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Quiet mode (less output)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let tagger = build_tagger(&args)?;
    let opts = match_options(&args);

    if let Some(dir) = &args.rules {
        return run_rules(dir, &tagger, &opts, &args);
    }

    let Some(text) = &args.text else {
        print_usage();
        return Ok(());
    };

    let tokens = tagger.tokenize(text);
    if args.tokens {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    if args.rule.is_empty() {
        anyhow::bail!("--text needs at least one --rule");
    }
    let rules = RuleSet::parse(&args.rule)?;
    let matched = match_rule_with(&tokens, &rules, &opts)?;

    if !args.quiet {
        eprintln!("=== {} alignment(s) ===", matched.len());
    }
    println!("{}", serde_json::to_string_pretty(&matched)?);

    if let Some(output) = &args.output {
        std::fs::write(output, serde_json::to_string_pretty(&matched)?)?;
    }

    Ok(())
}

fn build_tagger(args: &Args) -> Result<LexiconTagger> {
    let tagger = match &args.lexicon {
        Some(path) => LexiconTagger::with_extra(config::load_lexicon(path)?),
        None => LexiconTagger::default(),
    };
    Ok(match args.year {
        Some(year) => tagger.with_year(year),
        None => tagger,
    })
}

fn match_options(args: &Args) -> MatchOptions {
    let mut opts = MatchOptions::new();
    if args.skip_mismatch {
        opts = opts.with_mismatch_policy(MismatchPolicy::SkipToken);
    }
    if args.suppress_overlap {
        opts = opts.with_overlap(OverlapPolicy::Suppress);
    }
    if let Some(limit) = args.limit {
        opts = opts.with_limit(limit);
    }
    opts
}

fn run_rules(dir: &Path, tagger: &dyn Tagger, opts: &MatchOptions, args: &Args) -> Result<()> {
    let rule_files = config::load_rules_from_dir(dir)?;
    let test_count: usize = rule_files.iter().map(|rf| rf.tests.len()).sum();

    if !args.quiet {
        println!("=== Loaded {} rule files, {} tests ===", rule_files.len(), test_count);
        for rf in &rule_files {
            println!("  - {} ({} rules, {} tests)", rf.name, rf.rules.len(), rf.tests.len());
        }
    }

    let report = runner::run(&rule_files, tagger, opts);

    if !args.quiet {
        runner::print_summary(&report);
    }

    if let Some(output) = &args.output {
        runner::save_report(&report, output)?;
        println!("\nReport saved to {}", output.display());
    }

    if report.failed + report.errors > 0 {
        anyhow::bail!("{} of {} tests did not pass", report.failed + report.errors, report.test_count);
    }
    Ok(())
}

fn print_usage() {
    println!("Usage:");
    println!("  slotmatch --rules <dir>                          Run rule file tests");
    println!("  slotmatch -t <sentence> -r <rule> [-r <rule>...] Match rules against a sentence");
    println!("  slotmatch -t <sentence> --tokens                 Show the tagged tokens");
    println!();
    println!("Rule syntax:");
    println!("  check[noun]            literal \"check\" tagged as a noun");
    println!("  [number]->total        any number, captured as \"total\"");
    println!("  [currency]             any currency, not captured");
    println!();
    println!("Options:");
    println!("  --lexicon <file.yaml>  Extra lexicon entries");
    println!("  --skip-mismatch        Skip tokens whose value cannot be read");
    println!("  --suppress-overlap     Drop overlapping alignments");
    println!("  --limit <n>            Return at most n alignments");
    println!("  -o <file.json>         Save results to JSON file");
}
