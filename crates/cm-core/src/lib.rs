//! Circumvention Monitor Core Library
//!
//! This crate provides the matching engine that decides whether a network
//! response observed while loading a page belongs to a monitored
//! circumvention system, and collects the outcome of a monitor run.
//!
//! # Modules
//!
//! - `pattern`: literal / wildcard / regex pattern compilation
//! - `psl`: registrable domain extraction and third-party checks
//! - `url`: URL slicing without full parsing
//! - `types`: criteria, resource types and response events
//! - `matcher`: compiled criteria evaluated per response
//! - `result`: append-only result set
//! - `monitor`: run orchestration over a response source
//! - `error`: error types

pub mod error;
pub mod matcher;
pub mod monitor;
pub mod pattern;
pub mod psl;
pub mod result;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use error::{CoreError, CoreResult};
pub use matcher::Matcher;
pub use monitor::{Monitor, MonitorConfig, PageVisit, ResponseSource, SystemConfig};
pub use pattern::Pattern;
pub use psl::{get_etld1, is_third_party, registrable_domain};
pub use result::{Counts, NegativeOutcome, PositiveMatch, ResultSet, SystemResults};
pub use types::{Criteria, NegativeReason, ResourceType, ResponseEvent, RuleProperties, RuleScope};
