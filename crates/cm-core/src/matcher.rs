//! Criteria Matcher
//!
//! Every observed response of a monitored system goes through here, once per
//! configured criteria. Checks run cheapest first and stop at the first
//! failure.

use std::sync::Arc;

use crate::error::CoreResult;
use crate::pattern::Pattern;
use crate::psl::is_third_party;
use crate::types::{Criteria, ResourceType};

/// Compiled form of one [`Criteria`].
#[derive(Debug, Clone)]
pub struct Matcher {
    url_pattern: Option<Pattern>,
    content_pattern: Option<Pattern>,
    content_type: Option<ResourceType>,
    third_party: Option<bool>,
    criteria: Arc<Criteria>,
}

impl Matcher {
    /// Compile a criteria. Fails if either pattern is empty or invalid.
    pub fn new(criteria: Criteria) -> CoreResult<Self> {
        let url_pattern = criteria.url_pattern.as_deref().map(Pattern::compile).transpose()?;
        let content_pattern = criteria.content_pattern.as_deref().map(Pattern::compile).transpose()?;

        Ok(Self {
            url_pattern,
            content_pattern,
            content_type: criteria.content_type,
            third_party: criteria.third_party,
            criteria: Arc::new(criteria),
        })
    }

    /// Test a response against this criteria.
    ///
    /// `body` is `None` when no text content is available; content criteria
    /// then never match, while URL-only criteria still can.
    pub fn evaluate(
        &self,
        url: &str,
        source_page_url: Option<&str>,
        resource_type: ResourceType,
        body: Option<&str>,
    ) -> bool {
        if let Some(pattern) = &self.url_pattern {
            if !pattern.matches(url) {
                return false;
            }
        }

        if let Some(content_type) = self.content_type {
            if content_type != resource_type {
                return false;
            }
        }

        if let Some(pattern) = &self.content_pattern {
            match body {
                Some(body) if pattern.matches(body) => {}
                _ => return false,
            }
        }

        if let Some(third_party) = self.third_party {
            if third_party != is_third_party(url, source_page_url) {
                return false;
            }
        }

        true
    }

    /// Originating criteria, shared with recorded matches.
    pub fn criteria(&self) -> &Arc<Criteria> {
        &self.criteria
    }

    pub fn url_pattern(&self) -> Option<&Pattern> {
        self.url_pattern.as_ref()
    }

    pub fn content_pattern(&self) -> Option<&Pattern> {
        self.content_pattern.as_ref()
    }
}

// Compiled criteria are immutable and can be shared across threads.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Matcher>();
    assert_send_sync::<Pattern>();
};
