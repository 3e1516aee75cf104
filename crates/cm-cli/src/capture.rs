//! Recorded crawl captures
//!
//! A capture is the JSON output of a crawling session: for every visited page
//! either the responses observed while it loaded, or the error that kept it
//! from loading.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use cm_core::monitor::{PageVisit, ResponseSource};
use cm_core::types::ResponseEvent;

/// One captured page.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CapturedPage {
    Failed { error: String },
    Loaded { responses: Vec<ResponseEvent> },
}

/// Capture file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Capture {
    #[serde(default)]
    pub pages: HashMap<String, CapturedPage>,
}

impl Capture {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid capture JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to load capture '{}'", path.display()))
    }

    pub fn response_count(&self) -> usize {
        self.pages
            .values()
            .map(|p| match p {
                CapturedPage::Loaded { responses } => responses.len(),
                CapturedPage::Failed { .. } => 0,
            })
            .sum()
    }
}

impl ResponseSource for Capture {
    fn visit(&mut self, page_url: &str) -> PageVisit {
        match self.pages.get(page_url) {
            Some(CapturedPage::Loaded { responses }) => PageVisit::Loaded(responses.clone()),
            Some(CapturedPage::Failed { error }) => PageVisit::Failed(error.clone()),
            None => PageVisit::Failed("page missing from capture".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use cm_core::types::ResourceType;

    use super::*;

    const CAPTURE: &str = r#"{
        "pages": {
            "https://site.test/": {
                "responses": [
                    {
                        "url": "https://ads.test/abd.js",
                        "sourcePageUrl": "https://site.test/",
                        "resourceType": "script",
                        "statusCode": 200,
                        "body": "detect()"
                    },
                    {
                        "url": "https://ads.test/pixel.gif",
                        "resourceType": "image",
                        "statusCode": 200,
                        "body": null
                    }
                ]
            },
            "https://down.test/": { "error": "net::ERR_NAME_NOT_RESOLVED" }
        }
    }"#;

    #[test]
    fn test_parse_capture() {
        let capture = Capture::from_json(CAPTURE).unwrap();
        assert_eq!(capture.pages.len(), 2);
        assert_eq!(capture.response_count(), 2);
    }

    #[test]
    fn test_visit() {
        let mut capture = Capture::from_json(CAPTURE).unwrap();

        match capture.visit("https://site.test/") {
            PageVisit::Loaded(responses) => {
                assert_eq!(responses.len(), 2);
                assert_eq!(responses[0].resource_type, ResourceType::Script);
                assert_eq!(responses[1].body, None);
            }
            other => panic!("unexpected visit: {other:?}"),
        }

        assert_eq!(
            capture.visit("https://down.test/"),
            PageVisit::Failed("net::ERR_NAME_NOT_RESOLVED".to_string())
        );
        assert!(matches!(capture.visit("https://unknown.test/"), PageVisit::Failed(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CAPTURE.as_bytes()).unwrap();

        let capture = Capture::load(file.path()).unwrap();
        assert_eq!(capture.pages.len(), 2);
    }

    #[test]
    fn test_beacons_and_preflights_are_accepted() {
        let text = r#"{ "pages": { "https://site.test/": { "responses": [
            { "url": "https://ads.test/abd.js", "resourceType": "script", "statusCode": 200, "body": "detect()" },
            { "url": "https://ads.test/beacon", "resourceType": "ping", "statusCode": 204 },
            { "url": "https://ads.test/api", "resourceType": "preflight", "statusCode": 204 },
            { "url": "https://ads.test/next.js", "resourceType": "prefetch", "statusCode": 200 }
        ] } } }"#;

        let mut capture = Capture::from_json(text).unwrap();
        assert_eq!(capture.response_count(), 4);

        match capture.visit("https://site.test/") {
            PageVisit::Loaded(responses) => {
                assert_eq!(responses[1].resource_type, ResourceType::Ping);
                assert_eq!(responses[1].text_body(), None);
                assert_eq!(responses[2].resource_type, ResourceType::Preflight);
                assert_eq!(responses[3].resource_type, ResourceType::Prefetch);
            }
            other => panic!("unexpected visit: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_resource_type_is_rejected() {
        let text = r#"{ "pages": { "https://a.test/": { "responses": [
            { "url": "https://a.test/x", "resourceType": "banner", "statusCode": 200 }
        ] } } }"#;
        assert!(Capture::from_json(text).is_err());
    }
}
