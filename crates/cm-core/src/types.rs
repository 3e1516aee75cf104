//! Core type definitions for the circumvention monitor
//!
//! These types are the configuration and event contracts shared with the
//! crawling layer and the report/rule generators. All of them (de)serialize
//! as camelCase JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// Resource Types
// =============================================================================

/// Resource type of an observed network response, as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    TextTrack,
    Xhr,
    Fetch,
    EventSource,
    WebSocket,
    Manifest,
    SignedExchange,
    Ping,
    CspViolationReport,
    Preflight,
    Prefetch,
    Other,
}

impl ResourceType {
    pub const ALL: [ResourceType; 18] = [
        Self::Document,
        Self::Stylesheet,
        Self::Image,
        Self::Media,
        Self::Font,
        Self::Script,
        Self::TextTrack,
        Self::Xhr,
        Self::Fetch,
        Self::EventSource,
        Self::WebSocket,
        Self::Manifest,
        Self::SignedExchange,
        Self::Ping,
        Self::CspViolationReport,
        Self::Preflight,
        Self::Prefetch,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Stylesheet => "stylesheet",
            Self::Image => "image",
            Self::Media => "media",
            Self::Font => "font",
            Self::Script => "script",
            Self::TextTrack => "texttrack",
            Self::Xhr => "xhr",
            Self::Fetch => "fetch",
            Self::EventSource => "eventsource",
            Self::WebSocket => "websocket",
            Self::Manifest => "manifest",
            Self::SignedExchange => "signedexchange",
            Self::Ping => "ping",
            Self::CspViolationReport => "cspviolationreport",
            Self::Preflight => "preflight",
            Self::Prefetch => "prefetch",
            Self::Other => "other",
        }
    }

    /// Resource types whose text content is inspected by content criteria.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Document | Self::Stylesheet | Self::Script)
    }
}

impl FromStr for ResourceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown resource type '{s}'")))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Criteria
// =============================================================================

/// Granularity of the URL pattern in a generated blocking rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleScope {
    /// `||hostname^`
    #[default]
    Domain,
    /// `||registrable-domain^`
    RegisteredDomain,
    /// `||hostname/path`
    DomainAndPath,
}

/// Shape of the blocking rules generated from a criteria's matches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleProperties {
    #[serde(default)]
    pub scope: RuleScope,
    /// `None` derives `third-party` from the match; `Some(vec![])` means no modifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<String>>,
}

/// Configuration describing what marks a network response as a detection.
///
/// Every field is optional; a criteria with no fields matches every response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ResourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_party: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_properties: Option<RuleProperties>,
}

// =============================================================================
// Results
// =============================================================================

/// Why a page produced no positive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NegativeReason {
    /// The page could not be loaded
    WebsiteDown,
    /// The page loaded but nothing matched
    NotFound,
}

impl NegativeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebsiteDown => "WebsiteDown",
            Self::NotFound => "NotFound",
        }
    }
}

impl FromStr for NegativeReason {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WebsiteDown" => Ok(Self::WebsiteDown),
            "NotFound" => Ok(Self::NotFound),
            other => Err(CoreError::InvalidReason(other.to_string())),
        }
    }
}

impl fmt::Display for NegativeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Response Events
// =============================================================================

/// One network response observed while a page was loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEvent {
    /// Response URL
    pub url: String,
    /// URL of the page that triggered the request; the visited page when absent
    #[serde(default)]
    pub source_page_url: Option<String>,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub status_code: u16,
    /// Text body, absent for binary or unavailable content
    #[serde(default)]
    pub body: Option<String>,
}

impl ResponseEvent {
    /// Body used for content criteria.
    ///
    /// Only successful document, stylesheet and script responses carry text.
    pub fn text_body(&self) -> Option<&str> {
        if self.status_code == 200 && self.resource_type.is_textual() {
            self.body.as_deref()
        } else {
            None
        }
    }
}
