//! # API Route Modules
//!
//! - `content`: introduction and policy fragments consumed by the
//!   browsing client.
//! - `navigation`: the sidebar document (sections and published policies).
//! - `feedback`: employee questions about a specific policy.

pub mod content;
pub mod feedback;
pub mod navigation;
