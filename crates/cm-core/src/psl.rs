//! Registrable domain (eTLD+1) extraction and third-party checks
//!
//! Lookups use the Public Suffix List bundled with the crate, parsed on first
//! use. A different list can be installed with [`init_psl`] before the first
//! lookup.
//!
//! # Examples
//!
//! ```
//! use cm_core::psl::{get_etld1, is_third_party};
//!
//! assert_eq!(get_etld1("sub.example.com"), "example.com");
//! assert_eq!(get_etld1("sub.example.co.uk"), "example.co.uk");
//! assert_eq!(get_etld1("shop.example.com.sg"), "example.com.sg");
//! assert!(!is_third_party("https://a.example.org", Some("https://b.example.org")));
//! assert!(is_third_party("https://example.org", None));
//! ```

use std::net::IpAddr;
use std::sync::OnceLock;

use publicsuffix::{List, Psl};

use crate::error::{CoreError, CoreResult};
use crate::url::hostname;

// =============================================================================
// Global PSL State
// =============================================================================

/// Snapshot of <https://publicsuffix.org/list/public_suffix_list.dat>.
const BUNDLED_PSL: &str = include_str!("../data/public_suffix_list.dat");

static PSL: OnceLock<List> = OnceLock::new();

/// Install a Public Suffix List from its text form (`public_suffix_list.dat`)
/// in place of the bundled one.
///
/// Returns `false` if a list is already active, either from an earlier call
/// or because a lookup already loaded the bundled list.
pub fn init_psl(text: &str) -> CoreResult<bool> {
    let list = parse_list(text)?;
    let installed = PSL.set(list).is_ok();
    if installed {
        log::debug!("Public suffix list installed");
    } else {
        log::warn!("Public suffix list already active, ignoring new list");
    }
    Ok(installed)
}

fn parse_list(text: &str) -> CoreResult<List> {
    text.parse::<List>()
        .map_err(|e| CoreError::InvalidInput(format!("public suffix list: {e}")))
}

/// Active list, loading the bundled one on first use.
fn active_list() -> &'static List {
    PSL.get_or_init(|| match parse_list(BUNDLED_PSL) {
        Ok(list) => list,
        Err(e) => {
            // An empty list still applies the implicit `*` rule (last two labels)
            log::error!("Bundled {e}");
            List::new()
        }
    })
}

// =============================================================================
// eTLD+1 Extraction
// =============================================================================

/// Get the eTLD+1 (registrable domain) for a hostname.
///
/// IP literals, single-label hosts and hosts that are themselves a public
/// suffix are their own registrable domain.
pub fn get_etld1(host: &str) -> String {
    etld1_with(active_list(), host)
}

fn etld1_with(list: &List, host: &str) -> String {
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    if is_ip_literal(&host) || !host.contains('.') {
        return host;
    }

    match list.domain(host.as_bytes()) {
        Some(domain) => String::from_utf8_lossy(domain.as_bytes()).into_owned(),
        // The host is itself a public suffix
        None => host,
    }
}

fn is_ip_literal(host: &str) -> bool {
    (host.starts_with('[') && host.ends_with(']')) || host.parse::<IpAddr>().is_ok()
}

/// Registrable domain of a URL, or `None` when the URL has no host.
pub fn registrable_domain(url: &str) -> Option<String> {
    hostname(url).map(|host| get_etld1(&host))
}

// =============================================================================
// Party Checks
// =============================================================================

/// Check if a request is third-party relative to the page that loaded it.
///
/// An unknown or unparseable source, or an unparseable request URL, counts as
/// third-party.
pub fn is_third_party(url: &str, source_url: Option<&str>) -> bool {
    let source_domain = match source_url.and_then(registrable_domain) {
        Some(domain) => domain,
        None => return true,
    };

    match registrable_domain(url) {
        Some(domain) => domain != source_domain,
        None => true,
    }
}
