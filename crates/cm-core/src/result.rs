//! Accumulated monitor results
//!
//! The result set is an append-only log of positive matches and negative
//! outcomes, grouped by system in the order systems were first touched.
//! Nothing is deduplicated here; the report wants every occurrence.

use std::collections::HashMap;
use std::ops::AddAssign;
use std::sync::Arc;

use crate::types::{Criteria, NegativeReason};

/// A response that matched one of a system's criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct PositiveMatch {
    pub system_name: String,
    pub page_url: String,
    pub matched_url: String,
    pub criteria: Arc<Criteria>,
}

/// A page that produced no match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegativeOutcome {
    pub system_name: String,
    pub page_url: String,
    pub reason: NegativeReason,
}

/// Positive and negative counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub positive: usize,
    pub negative: usize,
}

impl AddAssign for Counts {
    fn add_assign(&mut self, rhs: Self) {
        self.positive += rhs.positive;
        self.negative += rhs.negative;
    }
}

/// All results recorded for one system.
#[derive(Debug, Clone, Default)]
pub struct SystemResults {
    pub name: String,
    pub positives: Vec<PositiveMatch>,
    pub negatives: Vec<NegativeOutcome>,
}

impl SystemResults {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            positive: self.positives.len(),
            negative: self.negatives.len(),
        }
    }
}

/// Results of one monitor run.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    systems: Vec<SystemResults>,
    index: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, system: &str) -> &mut SystemResults {
        let idx = match self.index.get(system) {
            Some(&idx) => idx,
            None => {
                self.systems.push(SystemResults::new(system));
                let idx = self.systems.len() - 1;
                self.index.insert(system.to_string(), idx);
                idx
            }
        };
        &mut self.systems[idx]
    }

    /// Make sure a system has an entry, even if nothing gets recorded for it.
    pub fn register_system(&mut self, system: &str) {
        self.entry(system);
    }

    /// Record a positive match.
    pub fn record_positive(&mut self, system: &str, page_url: &str, matched_url: &str, criteria: Arc<Criteria>) {
        self.entry(system).positives.push(PositiveMatch {
            system_name: system.to_string(),
            page_url: page_url.to_string(),
            matched_url: matched_url.to_string(),
            criteria,
        });
    }

    /// Record a negative outcome.
    pub fn record_negative(&mut self, system: &str, page_url: &str, reason: NegativeReason) {
        self.entry(system).negatives.push(NegativeOutcome {
            system_name: system.to_string(),
            page_url: page_url.to_string(),
            reason,
        });
    }

    /// Results of one system, if it was touched.
    pub fn system(&self, system: &str) -> Option<&SystemResults> {
        self.index.get(system).map(|&idx| &self.systems[idx])
    }

    /// Systems in the order they were first touched.
    pub fn systems(&self) -> impl Iterator<Item = &SystemResults> {
        self.systems.iter()
    }

    /// Counts for one system; zero for an unknown system.
    pub fn counts_for(&self, system: &str) -> Counts {
        self.system(system).map(SystemResults::counts).unwrap_or_default()
    }

    /// Counts summed across all systems.
    pub fn total_counts(&self) -> Counts {
        let mut total = Counts::default();
        for system in &self.systems {
            total += system.counts();
        }
        total
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
