//! # Browse Subcommand
//!
//! Attaches a navigator to a live server, replays the requested clicks and
//! prints the page state: URL, sidebar tree and content markup.

use anyhow::{Context, Result};
use clap::Args;

use handbook_client::page_url::POLICY_PARAM;
use handbook_client::{
    ClientConfig, HttpContentSource, LoadOutcome, NavigationState, Navigator, PageUrl, Sidebar,
};
use handbook_core::HANDBOOK_PAGE_PATH;

use crate::render_sidebar;

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Initial `policy` query parameter. Invalid values fall back to the
    /// introduction, as in a browser.
    #[arg(long)]
    pub policy: Option<String>,

    /// Full hosting page URL to start from. Overrides `--policy`.
    #[arg(long)]
    pub page_url: Option<String>,

    /// Sidebar entry to activate after the initial load.
    #[arg(long)]
    pub entry: Option<usize>,

    /// Related-policy triggers to click, in order, after any `--entry`.
    #[arg(long, num_args = 1..)]
    pub related: Vec<usize>,

    /// Print only the page URL and sidebar.
    #[arg(long)]
    pub no_content: bool,
}

/// Exit code 0 when the last load was applied, 2 when it failed.
pub fn run_browse(args: &BrowseArgs, config: &ClientConfig) -> Result<u8> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(browse(args, config))
}

async fn browse(args: &BrowseArgs, config: &ClientConfig) -> Result<u8> {
    let source = HttpContentSource::new(config)?;
    let navigation = source
        .fetch_navigation()
        .await
        .context("failed to fetch navigation")?;
    let sidebar = Sidebar::from_navigation(&navigation);
    let page = start_page(args, config)?;

    let navigator = Navigator::new(source, sidebar, page);
    let mut outcome = navigator.attach().await;
    tracing::info!(?outcome, "initial load");

    if let Some(index) = args.entry {
        outcome = navigator.activate_entry(index).await?;
        tracing::info!(index, ?outcome, "activated sidebar entry");
    }
    for &index in &args.related {
        outcome = navigator.activate_related(index).await?;
        tracing::info!(index, ?outcome, "activated related policy");
    }

    print!("{}", render_state(&navigator.snapshot(), !args.no_content));
    Ok(match outcome {
        LoadOutcome::Failed => 2,
        LoadOutcome::Applied | LoadOutcome::Superseded => 0,
    })
}

fn start_page(args: &BrowseArgs, config: &ClientConfig) -> Result<PageUrl> {
    if let Some(raw) = &args.page_url {
        return PageUrl::parse(raw).with_context(|| format!("invalid page URL {raw:?}"));
    }
    let mut url = config
        .base_url
        .join(HANDBOOK_PAGE_PATH)
        .context("invalid base URL")?;
    if let Some(policy) = &args.policy {
        url.query_pairs_mut().append_pair(POLICY_PARAM, policy);
    }
    Ok(PageUrl::new(url))
}

pub fn render_state(state: &NavigationState, content: bool) -> String {
    let mut out = format!("URL: {}\n\n{}", state.page_url, render_sidebar(&state.sidebar));
    if content {
        out.push('\n');
        out.push_str(state.display.markup());
        out.push('\n');
        for trigger in state.display.triggers() {
            out.push_str(&format!("related [{}] {}\n", trigger.index, trigger.url));
        }
    }
    out
}
