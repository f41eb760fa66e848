//! # Content Paths
//!
//! The server emits, and the browsing client parses, paths of the form
//! `/handbook/policy/{id}/content/`. A policy ID is recovered from any href
//! containing a `/policy/{digits}/` segment.

use crate::identity::PolicyId;

/// Where the introduction fragment is served.
pub const INTRODUCTION_CONTENT_PATH: &str = "/handbook/introduction/content/";

/// Hosting page for the browser; `?policy={id}` selects a policy.
pub const HANDBOOK_PAGE_PATH: &str = "/handbook/sections/";

/// Navigation document consumed by clients to build the sidebar.
pub const NAVIGATION_PATH: &str = "/handbook/navigation/";

const POLICY_SEGMENT: &str = "/policy/";

/// `/handbook/policy/{id}/content/`.
pub fn policy_content_path(id: PolicyId) -> String {
    format!("/handbook/policy/{id}/content/")
}

/// First `/policy/{digits}/` segment in `href`, as a policy ID.
///
/// Returns `None` when there is no such segment or the digits are not a
/// valid ID (zero, or too large).
pub fn extract_policy_id(href: &str) -> Option<PolicyId> {
    for (at, _) in href.match_indices(POLICY_SEGMENT) {
        let rest = &href[at + POLICY_SEGMENT.len()..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && rest[digits..].starts_with('/') {
            return rest[..digits].parse().ok();
        }
    }
    None
}
