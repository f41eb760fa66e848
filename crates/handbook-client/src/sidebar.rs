//! # Sidebar
//!
//! The navigation entries shown beside the content region: one introduction
//! entry followed by one entry per published policy, grouped into sections
//! with a disclosure (expanded/collapsed) each.
//!
//! Entries carry only their target href. The policy an entry refers to is
//! recovered from that href with [`extract_policy_id`], the same convention
//! the server uses to build it.

use handbook_core::{extract_policy_id, PolicyId};
use serde::Deserialize;

/// Navigation document served at `/handbook/navigation/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavigationDocument {
    pub introduction: IntroductionLink,
    pub sections: Vec<NavigationSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IntroductionLink {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavigationSection {
    pub number: String,
    pub title: String,
    pub policies: Vec<NavigationPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavigationPolicy {
    pub id: u64,
    pub number: String,
    pub title: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Introduction,
    Policy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub kind: EntryKind,
    pub label: String,
    pub href: String,
    /// Index into [`Sidebar::sections`]; `None` for the introduction.
    pub section: Option<usize>,
    pub active: bool,
}

impl NavEntry {
    /// Policy ID embedded in this entry's href, if any.
    pub fn policy_id(&self) -> Option<PolicyId> {
        extract_policy_id(&self.href)
    }
}

/// A section's collapsible group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    pub number: String,
    pub title: String,
    pub expanded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sidebar {
    entries: Vec<NavEntry>,
    sections: Vec<Disclosure>,
}

impl Sidebar {
    /// Build from the server's navigation document. All sections start
    /// collapsed and nothing is active.
    pub fn from_navigation(doc: &NavigationDocument) -> Self {
        let mut entries = vec![NavEntry {
            kind: EntryKind::Introduction,
            label: "Introduction".to_string(),
            href: doc.introduction.href.clone(),
            section: None,
            active: false,
        }];
        let mut sections = Vec::with_capacity(doc.sections.len());

        for (index, section) in doc.sections.iter().enumerate() {
            sections.push(Disclosure {
                number: section.number.clone(),
                title: section.title.clone(),
                expanded: false,
            });
            entries.extend(section.policies.iter().map(|p| NavEntry {
                kind: EntryKind::Policy,
                label: format!("{} {}", p.number, p.title),
                href: p.href.clone(),
                section: Some(index),
                active: false,
            }));
        }

        Self { entries, sections }
    }

    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&NavEntry> {
        self.entries.get(index)
    }

    pub fn sections(&self) -> &[Disclosure] {
        &self.sections
    }

    /// Mark the entry whose href embeds `id` and force its section open.
    ///
    /// Every entry's active marker is cleared first. Other sections keep
    /// their open/closed state. Returns whether any entry matched.
    pub fn sync(&mut self, id: PolicyId) -> bool {
        let mut matched = false;
        for entry in &mut self.entries {
            entry.active = false;
            if entry.policy_id() == Some(id) {
                entry.active = true;
                matched = true;
                if let Some(disclosure) = entry.section.and_then(|s| self.sections.get_mut(s)) {
                    disclosure.expanded = true;
                }
            }
        }
        matched
    }

    /// Mark only the introduction entry active.
    pub fn activate_introduction(&mut self) {
        for entry in &mut self.entries {
            entry.active = entry.kind == EntryKind::Introduction;
        }
    }

    /// User toggles a section open or closed. Returns the new state.
    pub fn toggle_section(&mut self, index: usize) -> Option<bool> {
        let disclosure = self.sections.get_mut(index)?;
        disclosure.expanded = !disclosure.expanded;
        Some(disclosure.expanded)
    }

    pub fn active_entries(&self) -> impl Iterator<Item = &NavEntry> {
        self.entries.iter().filter(|e| e.active)
    }

    /// The policy of the single active entry, if a policy entry is active.
    pub fn active_policy(&self) -> Option<PolicyId> {
        self.active_entries().find_map(NavEntry::policy_id)
    }

    pub fn expanded_sections(&self) -> Vec<usize> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, d)| d.expanded)
            .map(|(i, _)| i)
            .collect()
    }
}
