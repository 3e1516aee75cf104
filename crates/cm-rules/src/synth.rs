//! Blocking rule synthesis
//!
//! Turns positive matches into filter-list lines. Output is grouped by system,
//! then by page, with `!` comments recording where each rule came from. A rule
//! text is emitted at most once per run, at its first occurrence.

use std::collections::HashSet;

use cm_core::psl::{is_third_party, registrable_domain};
use cm_core::result::{PositiveMatch, ResultSet, SystemResults};
use cm_core::types::{Criteria, RuleProperties, RuleScope};
use cm_core::url::{extract_path, hostname};

/// Prefix of comment lines.
pub const COMMENT_PREFIX: &str = "! ";

/// Separator line around a system header.
pub const SEPARATOR: &str = "! ------------------------------";

const THIRD_PARTY_MODIFIER: &str = "third-party";

/// Generate deduplicated blocking rules for every system with positive matches.
pub fn synthesize_rules(results: &ResultSet) -> Vec<String> {
    let mut lines = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for system in results.systems() {
        if system.positives.is_empty() {
            continue;
        }
        synthesize_system(system, &mut seen, &mut lines);
    }

    lines
}

fn synthesize_system(system: &SystemResults, seen: &mut HashSet<String>, lines: &mut Vec<String>) {
    lines.push(SEPARATOR.to_string());
    lines.push(format!("{COMMENT_PREFIX}System: {}", system.name));
    lines.push(SEPARATOR.to_string());

    for (page_url, matches) in group_by_page(&system.positives) {
        let mut page_rules = Vec::new();

        for m in matches {
            let rule = match build_rule(&m.matched_url, &m.page_url, &m.criteria) {
                Some(rule) => rule,
                None => {
                    log::warn!("{}: cannot build a rule for {}", system.name, m.matched_url);
                    continue;
                }
            };
            if seen.insert(rule.clone()) {
                page_rules.push(rule);
            }
        }

        if !page_rules.is_empty() {
            lines.push(format!("{COMMENT_PREFIX}Found on: {page_url}"));
            lines.extend(page_rules);
        }
    }
}

/// Group matches by page, keeping first-seen page order.
fn group_by_page(positives: &[PositiveMatch]) -> Vec<(&str, Vec<&PositiveMatch>)> {
    let mut groups: Vec<(&str, Vec<&PositiveMatch>)> = Vec::new();

    for m in positives {
        match groups.iter_mut().find(|(page, _)| *page == m.page_url) {
            Some((_, group)) => group.push(m),
            None => groups.push((m.page_url.as_str(), vec![m])),
        }
    }

    groups
}

/// Characters with a meaning in rule syntax that a path cannot carry verbatim.
const RULE_SYNTAX_CHARS: [char; 2] = ['$', '^'];

/// Build the blocking rule for one matched URL.
///
/// Returns `None` when the URL has no host, or for a path-scoped rule whose
/// path contains `$` or `^`.
pub fn build_rule(url: &str, page_url: &str, criteria: &Criteria) -> Option<String> {
    let default_props = RuleProperties::default();
    let props = criteria.rule_properties.as_ref().unwrap_or(&default_props);

    let pattern = match props.scope {
        RuleScope::Domain => format!("||{}^", hostname(url)?),
        RuleScope::RegisteredDomain => format!("||{}^", registrable_domain(url)?),
        RuleScope::DomainAndPath => {
            let path = extract_path(url);
            if path.contains(RULE_SYNTAX_CHARS) {
                return None;
            }
            format!("||{}{}", hostname(url)?, path)
        }
    };

    let derived;
    let modifiers: &[String] = match &props.modifiers {
        Some(explicit) => explicit,
        None => {
            derived = if is_third_party(url, Some(page_url)) {
                vec![THIRD_PARTY_MODIFIER.to_string()]
            } else {
                Vec::new()
            };
            &derived
        }
    };

    if modifiers.is_empty() {
        Some(pattern)
    } else {
        Some(format!("{}${}", pattern, modifiers.join(",")))
    }
}
