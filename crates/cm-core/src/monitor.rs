//! Monitor run orchestration
//!
//! Drives a [`ResponseSource`] page by page for every configured system and
//! records the outcome in a [`ResultSet`]. The source is whatever produced
//! the responses (a browser session, a recorded capture); the monitor never
//! fetches anything itself.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::matcher::Matcher;
use crate::result::ResultSet;
use crate::types::{Criteria, NegativeReason, ResponseEvent};

// =============================================================================
// Configuration
// =============================================================================

/// One monitored circumvention system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub name: String,
    #[serde(default)]
    pub criteria: Vec<Criteria>,
    #[serde(default)]
    pub pages: Vec<String>,
}

/// Monitor configuration: the list of observed systems.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub observe: Vec<SystemConfig>,
}

// =============================================================================
// Response Source
// =============================================================================

/// Outcome of loading one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageVisit {
    /// The page loaded; every response observed while loading it
    Loaded(Vec<ResponseEvent>),
    /// The page could not be loaded
    Failed(String),
}

/// Supplies the responses observed while loading a page.
pub trait ResponseSource {
    fn visit(&mut self, page_url: &str) -> PageVisit;
}

// =============================================================================
// Monitor
// =============================================================================

struct MonitoredSystem {
    name: String,
    pages: Vec<String>,
    matchers: Vec<Matcher>,
}

/// Compiled monitor configuration.
pub struct Monitor {
    systems: Vec<MonitoredSystem>,
}

impl Monitor {
    /// Compile every system's criteria. The first invalid pattern aborts.
    pub fn new(config: MonitorConfig) -> CoreResult<Self> {
        let mut systems = Vec::with_capacity(config.observe.len());

        for system in config.observe {
            let matchers = system
                .criteria
                .into_iter()
                .map(Matcher::new)
                .collect::<CoreResult<Vec<_>>>()
                .map_err(|e| e.in_system(&system.name))?;

            systems.push(MonitoredSystem {
                name: system.name,
                pages: system.pages,
                matchers,
            });
        }

        Ok(Self { systems })
    }

    /// Compiled matchers per system, in configuration order.
    pub fn matchers(&self) -> impl Iterator<Item = (&str, &[Matcher])> + '_ {
        self.systems
            .iter()
            .map(|s| (s.name.as_str(), s.matchers.as_slice()))
    }

    /// Run every system against `source`.
    pub fn run<S: ResponseSource>(&self, source: &mut S) -> ResultSet {
        let mut results = ResultSet::new();

        for system in &self.systems {
            log::info!("Evaluating {}", system.name);
            results.register_system(&system.name);

            let mut system_matches = 0usize;
            for page_url in &system.pages {
                log::info!("Checking {}", page_url);

                match source.visit(page_url) {
                    PageVisit::Loaded(responses) => {
                        let page_matches = evaluate_page(system, page_url, &responses, &mut results);
                        if page_matches == 0 {
                            results.record_negative(&system.name, page_url, NegativeReason::NotFound);
                        }
                        system_matches += page_matches;
                    }
                    PageVisit::Failed(reason) => {
                        log::warn!("{} is not available: {}", page_url, reason);
                        results.record_negative(&system.name, page_url, NegativeReason::WebsiteDown);
                    }
                }
            }

            log::info!("Finished evaluating {}. Matches: {}", system.name, system_matches);
        }

        results
    }
}

/// Evaluate all responses of one page. Each response records at most one
/// positive, for the first criteria it matches.
fn evaluate_page(
    system: &MonitoredSystem,
    page_url: &str,
    responses: &[ResponseEvent],
    results: &mut ResultSet,
) -> usize {
    let mut matches = 0usize;

    for response in responses {
        let body = response.text_body();
        let source_page = response.source_page_url.as_deref().unwrap_or(page_url);
        log::debug!(
            "{} {} content found: {}",
            response.url,
            response.resource_type,
            body.is_some()
        );

        let hit = system.matchers.iter().find(|m| {
            m.evaluate(&response.url, Some(source_page), response.resource_type, body)
        });

        if let Some(matcher) = hit {
            results.record_positive(&system.name, page_url, &response.url, matcher.criteria().clone());
            matches += 1;
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::CoreError;
    use crate::result::Counts;
    use crate::types::ResourceType;

    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<String, PageVisit>,
        visited: Vec<String>,
    }

    impl ResponseSource for FakeSource {
        fn visit(&mut self, page_url: &str) -> PageVisit {
            self.visited.push(page_url.to_string());
            self.pages
                .get(page_url)
                .cloned()
                .unwrap_or_else(|| PageVisit::Failed("connection refused".to_string()))
        }
    }

    fn response(url: &str, ty: ResourceType, status: u16, body: Option<&str>) -> ResponseEvent {
        ResponseEvent {
            url: url.to_string(),
            source_page_url: None,
            resource_type: ty,
            status_code: status,
            body: body.map(str::to_string),
        }
    }

    fn test_config(page: &str) -> MonitorConfig {
        serde_json::from_value(serde_json::json!({
            "observe": [{
                "name": "Test",
                "criteria": [{
                    "urlPattern": "/.*/",
                    "contentPattern": "*test*",
                    "contentType": "script",
                    "thirdParty": false
                }],
                "pages": [page]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_positive_website() {
        let page = "http://localhost:8080/";
        let mut source = FakeSource::default();
        source.pages.insert(
            page.to_string(),
            PageVisit::Loaded(vec![
                response(page, ResourceType::Document, 200, Some("<html><script src=\"/script.js\"></script></html>")),
                response("http://localhost:8080/script.js", ResourceType::Script, 200, Some("/*test*/")),
            ]),
        );

        let monitor = Monitor::new(test_config(page)).unwrap();
        let results = monitor.run(&mut source);

        assert_eq!(results.total_counts(), Counts { positive: 1, negative: 0 });
        let system = results.system("Test").unwrap();
        assert_eq!(system.positives[0].matched_url, "http://localhost:8080/script.js");
        assert_eq!(system.positives[0].page_url, page);
        assert_eq!(system.positives[0].criteria.content_pattern.as_deref(), Some("*test*"));
    }

    #[test]
    fn test_dead_website() {
        let mut source = FakeSource::default();
        let monitor = Monitor::new(test_config("http://localhost:1/")).unwrap();
        let results = monitor.run(&mut source);

        assert_eq!(results.total_counts(), Counts { positive: 0, negative: 1 });
        assert_eq!(
            results.system("Test").unwrap().negatives[0].reason,
            NegativeReason::WebsiteDown
        );
    }

    #[test]
    fn test_no_match_is_not_found() {
        let page = "http://localhost/";
        let mut source = FakeSource::default();
        source.pages.insert(
            page.to_string(),
            PageVisit::Loaded(vec![
                // body would match, but a 404 carries no text
                response("http://localhost/script.js", ResourceType::Script, 404, Some("/*test*/")),
            ]),
        );

        let monitor = Monitor::new(test_config(page)).unwrap();
        let results = monitor.run(&mut source);

        assert_eq!(results.total_counts(), Counts { positive: 0, negative: 1 });
        assert_eq!(
            results.system("Test").unwrap().negatives[0].reason,
            NegativeReason::NotFound
        );
    }

    #[test]
    fn test_first_matching_criteria_wins() {
        let page = "https://site.test/";
        let config: MonitorConfig = serde_json::from_value(serde_json::json!({
            "observe": [{
                "name": "Ads",
                "criteria": [
                    { "urlPattern": "first", "ruleProperties": { "scope": "domainAndPath" } },
                    { "urlPattern": "ads" }
                ],
                "pages": [page]
            }]
        }))
        .unwrap();

        let mut source = FakeSource::default();
        source.pages.insert(
            page.to_string(),
            PageVisit::Loaded(vec![
                response("https://ads.test/first.js", ResourceType::Script, 200, None),
                response("https://ads.test/second.js", ResourceType::Image, 200, None),
            ]),
        );

        let results = Monitor::new(config).unwrap().run(&mut source);
        let positives = &results.system("Ads").unwrap().positives;
        assert_eq!(positives.len(), 2);
        assert_eq!(positives[0].criteria.url_pattern.as_deref(), Some("first"));
        assert_eq!(positives[1].criteria.url_pattern.as_deref(), Some("ads"));
    }

    #[test]
    fn test_system_without_pages_is_registered() {
        let config = MonitorConfig {
            observe: vec![SystemConfig {
                name: "Idle".to_string(),
                criteria: vec![],
                pages: vec![],
            }],
        };
        let mut source = FakeSource::default();
        let results = Monitor::new(config).unwrap().run(&mut source);

        assert!(results.system("Idle").is_some());
        assert!(source.visited.is_empty());
    }

    #[test]
    fn test_matchers_keep_configuration_order() {
        let config: MonitorConfig = serde_json::from_value(serde_json::json!({
            "observe": [
                { "name": "A", "criteria": [{ "urlPattern": "/ads/" }, { "contentPattern": "*abd*" }] },
                { "name": "B" }
            ]
        }))
        .unwrap();
        let monitor = Monitor::new(config).unwrap();

        let systems: Vec<_> = monitor.matchers().collect();
        assert_eq!(systems.len(), 2);
        assert_eq!(systems[0].0, "A");
        assert_eq!(systems[0].1.len(), 2);
        assert!(systems[0].1[0].url_pattern().is_some_and(|p| p.is_regex()));
        assert!(systems[0].1[1].content_pattern().is_some_and(|p| p.is_wildcard()));
        assert_eq!(systems[1].0, "B");
        assert!(systems[1].1.is_empty());
    }

    #[test]
    fn test_invalid_criteria_names_system() {
        let config: MonitorConfig = serde_json::from_value(serde_json::json!({
            "observe": [{ "name": "Broken", "criteria": [{ "urlPattern": "" }], "pages": [] }]
        }))
        .unwrap();

        match Monitor::new(config) {
            Err(CoreError::InSystem { system, error }) => {
                assert_eq!(system, "Broken");
                assert!(matches!(*error, CoreError::InvalidPattern { .. }));
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }
}
