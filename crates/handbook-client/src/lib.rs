//! # handbook-client: Content Fetcher for the Employee Handbook
//!
//! Keeps three things in step while the user browses the handbook: the
//! content region, the sidebar's active/expanded markers, and the `policy`
//! query parameter of the hosting page URL.
//!
//! ## Triggers
//!
//! - **Initial load** ([`Navigator::attach`]): `?policy={id}` selects a
//!   policy, otherwise the introduction is shown.
//! - **Sidebar entry** ([`Navigator::activate_entry`]).
//! - **Related-policy trigger** ([`Navigator::activate_related`]): any
//!   element in the displayed content carrying a `data-url` attribute.
//!
//! ## Failure Model
//!
//! A failed fetch, whether a transport error, a non-2xx status or a
//! malformed policy envelope, replaces the content region with
//! [`ERROR_NOTICE`] and is logged. It never propagates past the interaction
//! that caused it and never blocks later ones.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use handbook_client::{ClientConfig, HttpContentSource, Navigator, PageUrl, Sidebar};
//!
//! let config = ClientConfig::new("http://localhost:8080")?;
//! let source = HttpContentSource::new(&config)?;
//! let sidebar = Sidebar::from_navigation(&source.fetch_navigation().await?);
//! let page = PageUrl::handbook_page(&config.base_url)?;
//!
//! let navigator = Navigator::new(source, sidebar, page);
//! navigator.attach().await;
//! println!("{}", navigator.snapshot().display.markup());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod navigator;
pub mod page_url;
pub mod sidebar;
pub mod source;

pub use config::ClientConfig;
pub use display::{DisplaySurface, Displayed, RelatedTrigger, ERROR_NOTICE};
pub use error::{ConfigError, FetchError, NavigationError};
pub use navigator::{LoadOutcome, NavigationState, Navigator};
pub use page_url::PageUrl;
pub use sidebar::{Disclosure, EntryKind, NavEntry, NavigationDocument, Sidebar};
pub use source::{ContentSource, HttpContentSource, PolicyEnvelope};
