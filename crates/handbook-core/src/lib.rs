//! # handbook-core: Foundational Types for the Employee Handbook
//!
//! Every other crate in the workspace depends on `handbook-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** [`PolicyId`], [`SectionNumber`]
//!    and [`PolicyNumber`] validate at construction. No bare integers or
//!    strings cross crate boundaries as identifiers.
//!
//! 2. **One aggregate owns the numbering rules.** Policy numbers are derived
//!    from their section (`3.0` owns `3.1`, `3.2`, ...). [`Handbook`] assigns
//!    them on insert and rewrites them when a section is renumbered, so no
//!    caller can produce a policy whose number disagrees with its section.
//!
//! 3. **URL conventions live in one place.** The `/policy/{id}/` path segment
//!    is how the browsing client recovers a policy ID from a link. Both the
//!    server (which emits links) and the client (which parses them) go through
//!    [`paths`], so renaming the convention is a single-file change.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod handbook;
pub mod identity;
pub mod model;
pub mod paths;
pub mod seed;

pub use error::{HandbookError, ValidationError};
pub use handbook::{Handbook, PolicyDraft};
pub use identity::{PolicyId, PolicyNumber, SectionNumber};
pub use model::{Definition, Policy, PolicyRequest, ProcedureStep, ReviewPeriod, Section};
pub use paths::{
    extract_policy_id, policy_content_path, HANDBOOK_PAGE_PATH, INTRODUCTION_CONTENT_PATH,
    NAVIGATION_PATH,
};
pub use seed::{HandbookSeed, SeedError};
