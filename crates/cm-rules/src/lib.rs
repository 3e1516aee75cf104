//! Circumvention Monitor Output Generators
//!
//! This crate turns a finished [`cm_core::ResultSet`] into a Markdown report
//! and into ABP/uBO-style network blocking rules.

pub mod report;
pub mod synth;

pub use report::render_report;
pub use synth::{build_rule, synthesize_rules, COMMENT_PREFIX, SEPARATOR};
