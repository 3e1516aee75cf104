//! Markdown report rendering

use cm_core::result::{ResultSet, SystemResults};

const REPORT_TITLE: &str = "# Circumvention report\n\n";

/// Render the human-readable report for a result set.
///
/// Systems appear in the order they were first touched. Each gets a heading;
/// the positive and negative tables are only emitted when non-empty.
pub fn render_report(results: &ResultSet) -> String {
    let mut out = String::from(REPORT_TITLE);

    for system in results.systems() {
        render_system(system, &mut out);
    }

    out
}

fn render_system(system: &SystemResults, out: &mut String) {
    out.push_str(&format!("### {}\n\n", system.name));

    if !system.positives.is_empty() {
        out.push_str("#### Positive matches\n\n");
        out.push_str("| Page | URL |\n");
        out.push_str("| --- | --- |\n");
        for m in &system.positives {
            out.push_str(&format!("| {} | {} |\n", m.page_url, m.matched_url));
        }
        out.push('\n');
    }

    if !system.negatives.is_empty() {
        out.push_str("#### Negative matches\n\n");
        out.push_str("| Page | Reason |\n");
        out.push_str("| --- | --- |\n");
        for n in &system.negatives {
            out.push_str(&format!("| {} | {} |\n", n.page_url, n.reason));
        }
        out.push('\n');
    }
}
