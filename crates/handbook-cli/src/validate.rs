//! # Validate Subcommand
//!
//! Loads a YAML seed file through the same path the server uses at startup
//! and reports what it would serve.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use handbook_core::{Handbook, HandbookSeed};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Seed file to check.
    pub seed: PathBuf,

    /// List every policy with its number and publication state.
    #[arg(long)]
    pub list: bool,
}

pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let handbook = load(args)?;
    print!("{}", summarize(&handbook, args.list));
    Ok(0)
}

fn load(args: &ValidateArgs) -> Result<Handbook> {
    let handbook = HandbookSeed::from_path(&args.seed)
        .and_then(HandbookSeed::into_handbook)
        .with_context(|| format!("invalid seed file {}", args.seed.display()))?;
    handbook
        .check_references()
        .context("seed contains a dangling related-policy reference")?;
    tracing::debug!(path = %args.seed.display(), "seed file is valid");
    Ok(handbook)
}

pub fn summarize(handbook: &Handbook, list: bool) -> String {
    let drafts = handbook.policy_count() - handbook.published_count();
    let mut out = format!(
        "OK: {} sections, {} policies ({} published, {} drafts)\n",
        handbook.section_count(),
        handbook.policy_count(),
        handbook.published_count(),
        drafts,
    );
    if list {
        for section in handbook.sections() {
            out.push_str(&format!("{} {}\n", section.number, section.title));
            for policy in handbook.policies_in(section.number) {
                let state = if policy.published { "" } else { " (draft)" };
                out.push_str(&format!("  [{}] {}{state}\n", policy.id, policy.heading()));
            }
        }
    }
    out
}
