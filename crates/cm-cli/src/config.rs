use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use cm_core::monitor::MonitorConfig;

pub fn parse_config(text: &str) -> Result<MonitorConfig> {
    serde_json::from_str(text).context("Invalid monitor configuration JSON")
}

pub fn load_config(path: &Path) -> Result<MonitorConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    parse_config(&text).with_context(|| format!("Failed to load configuration '{}'", path.display()))
}

/// Install the Public Suffix List stored at `path`.
pub fn load_psl(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    cm_core::psl::init_psl(&text)
        .with_context(|| format!("Failed to load public suffix list '{}'", path.display()))?;
    Ok(())
}

pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create '{}'", parent.display()))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("Failed to write '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use cm_core::types::{ResourceType, RuleScope};

    use super::*;

    #[test]
    fn test_parse_config() {
        let config = parse_config(
            r#"{
                "observe": [{
                    "name": "AdDefend",
                    "criteria": [
                        {
                            "contentPattern": "*adblock*detected*",
                            "contentType": "script",
                            "thirdParty": true,
                            "ruleProperties": { "scope": "domainAndPath", "modifiers": ["script"] }
                        },
                        { "urlPattern": "/^https?:\\/\\/[a-z0-9]+\\.cloudfront\\.net\\//" }
                    ],
                    "pages": ["https://example.org/", "https://example.net/"]
                }]
            }"#,
        )
        .unwrap();

        let system = &config.observe[0];
        assert_eq!(system.name, "AdDefend");
        assert_eq!(system.pages.len(), 2);
        assert_eq!(system.criteria[0].content_type, Some(ResourceType::Script));
        assert_eq!(
            system.criteria[0].rule_properties.as_ref().map(|p| p.scope),
            Some(RuleScope::DomainAndPath)
        );
        assert_eq!(system.criteria[1].third_party, None);
    }

    #[test]
    fn test_parse_config_rejects_bad_scope() {
        let err = parse_config(
            r#"{ "observe": [{ "name": "x", "criteria": [{ "ruleProperties": { "scope": "everything" } }] }] }"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_write_output_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("rules.txt");
        write_output(&path, "||ads.test^\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "||ads.test^\n");
    }
}
