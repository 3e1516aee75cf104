//! Circumvention Monitor CLI
//!
//! Runs monitored-system criteria against a recorded crawl capture and writes
//! the Markdown report and the generated blocking rules.

mod capture;
mod config;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use cm_core::monitor::Monitor;
use cm_core::pattern::Pattern;
use cm_core::types::{Criteria, RuleProperties, RuleScope};
use cm_core::Matcher;
use cm_rules::{build_rule, render_report, synthesize_rules};

use crate::capture::Capture;

#[derive(Parser)]
#[command(name = "cm-cli")]
#[command(about = "Circumvention monitor: match crawl captures and generate blocking rules")]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a capture and write the report and rules
    Run {
        /// Monitor configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Recorded crawl capture (JSON)
        #[arg(long)]
        capture: PathBuf,

        /// Markdown report output; printed to stdout when omitted
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Blocking rules output
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Public Suffix List file (public_suffix_list.dat)
        #[arg(long)]
        psl: Option<PathBuf>,
    },

    /// Compile every criteria of a configuration
    Validate {
        /// Monitor configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print the blocking rule generated for a single match
    Rule {
        /// Matched resource URL
        #[arg(long)]
        url: String,

        /// Page the resource was found on
        #[arg(long)]
        page: String,

        #[arg(long, value_enum, default_value_t = ScopeArg::Domain)]
        scope: ScopeArg,

        /// Explicit modifier; derived from the third-party relation when none is given
        #[arg(long = "modifier")]
        modifiers: Vec<String>,

        /// Public Suffix List file (public_suffix_list.dat)
        #[arg(long)]
        psl: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Domain,
    RegisteredDomain,
    DomainAndPath,
}

impl From<ScopeArg> for RuleScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Domain => RuleScope::Domain,
            ScopeArg::RegisteredDomain => RuleScope::RegisteredDomain,
            ScopeArg::DomainAndPath => RuleScope::DomainAndPath,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let result = match cli.command {
        Commands::Run {
            config,
            capture,
            report,
            rules,
            psl,
        } => cmd_run(&config, &capture, report.as_deref(), rules.as_deref(), psl.as_deref()),
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Rule {
            url,
            page,
            scope,
            modifiers,
            psl,
        } => cmd_rule(&url, &page, scope.into(), modifiers, psl.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn cmd_run(
    config_path: &Path,
    capture_path: &Path,
    report_path: Option<&Path>,
    rules_path: Option<&Path>,
    psl_path: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();

    match psl_path {
        Some(path) => config::load_psl(path)?,
        None => log::debug!("Using bundled public suffix list"),
    }

    let monitor_config = config::load_config(config_path)?;
    let monitor = Monitor::new(monitor_config)
        .with_context(|| format!("Invalid criteria in '{}'", config_path.display()))?;

    let mut capture = Capture::load(capture_path)?;
    log::info!(
        "Loaded capture with {} pages, {} responses",
        capture.pages.len(),
        capture.response_count()
    );

    let results = monitor.run(&mut capture);
    if results.is_empty() {
        log::warn!("'{}' does not observe any system", config_path.display());
    }
    let counts = results.total_counts();

    let report = render_report(&results);
    match report_path {
        Some(path) => config::write_output(path, &report)?,
        None => print!("{report}"),
    }

    let rules = synthesize_rules(&results);
    if let Some(path) = rules_path {
        let mut text = rules.join("\n");
        text.push('\n');
        config::write_output(path, &text)?;
    }

    log::info!(
        "Finished in {:.1}ms. Positive: {}, negative: {}, rule lines: {}",
        start.elapsed().as_secs_f64() * 1000.0,
        counts.positive,
        counts.negative,
        rules.len()
    );

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    let monitor_config = config::load_config(config_path)?;
    let pages: Vec<usize> = monitor_config.observe.iter().map(|s| s.pages.len()).collect();

    let monitor = Monitor::new(monitor_config)
        .with_context(|| format!("Invalid criteria in '{}'", config_path.display()))?;

    if pages.is_empty() {
        bail!("'{}' does not observe any system", config_path.display());
    }

    println!("Configuration '{}' is valid", config_path.display());
    for ((name, matchers), pages) in monitor.matchers().zip(pages) {
        println!("  {:<24} criteria: {:>3}  pages: {:>3}", name, matchers.len(), pages);
        for matcher in matchers {
            println!("    {}", describe_matcher(matcher));
        }
    }

    Ok(())
}

fn describe_matcher(matcher: &Matcher) -> String {
    let mut parts = Vec::new();
    if let Some(p) = matcher.url_pattern() {
        parts.push(format!("url {} ({})", p, pattern_kind(p)));
    }
    if let Some(p) = matcher.content_pattern() {
        parts.push(format!("content {} ({})", p, pattern_kind(p)));
    }
    if let Some(ty) = matcher.criteria().content_type {
        parts.push(format!("type {ty}"));
    }
    if let Some(third_party) = matcher.criteria().third_party {
        parts.push(format!("third-party {third_party}"));
    }

    if parts.is_empty() {
        "matches every response".to_string()
    } else {
        parts.join(", ")
    }
}

fn pattern_kind(pattern: &Pattern) -> &'static str {
    if pattern.is_regex() {
        "regex"
    } else if pattern.is_wildcard() {
        "wildcard"
    } else {
        "substring"
    }
}

fn cmd_rule(url: &str, page: &str, scope: RuleScope, modifiers: Vec<String>, psl_path: Option<&Path>) -> Result<()> {
    if let Some(path) = psl_path {
        config::load_psl(path)?;
    }

    let criteria = Criteria {
        rule_properties: Some(RuleProperties {
            scope,
            modifiers: if modifiers.is_empty() { None } else { Some(modifiers) },
        }),
        ..Criteria::default()
    };

    match build_rule(url, page, &criteria) {
        Some(rule) => {
            println!("{rule}");
            Ok(())
        }
        None => bail!("cannot build a rule for '{}'", url),
    }
}
