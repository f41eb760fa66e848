//! # handbook-cli: Terminal Front End for the Employee Handbook
//!
//! ## Subcommands
//!
//! - `handbook browse`: run the content fetcher against a live server and
//!   print the resulting page state. Related-policy triggers can be clicked
//!   in sequence with `--related`.
//! - `handbook sidebar`: print the navigation tree the server publishes.
//! - `handbook validate`: check a YAML seed file without starting a server.
//!
//! ```bash
//! handbook --base-url http://localhost:8080 browse --policy 42 --related 0
//! handbook validate seed/handbook.yaml
//! ```

pub mod browse;
pub mod validate;

use handbook_client::{EntryKind, Sidebar};

/// Render the sidebar as an indented tree. `*` marks the active entry,
/// `+`/`-` an expanded/collapsed section.
pub fn render_sidebar(sidebar: &Sidebar) -> String {
    let line = |index: usize, indent: &str, out: &mut String| {
        let entry = &sidebar.entries()[index];
        let marker = if entry.active { '*' } else { ' ' };
        out.push_str(&format!("{indent}{marker} [{index}] {}\n", entry.label));
    };

    let mut out = String::new();
    for (index, entry) in sidebar.entries().iter().enumerate() {
        if entry.kind == EntryKind::Introduction {
            line(index, "", &mut out);
        }
    }
    for (section, disclosure) in sidebar.sections().iter().enumerate() {
        let fold = if disclosure.expanded { '+' } else { '-' };
        out.push_str(&format!("{fold} {} {}\n", disclosure.number, disclosure.title));
        for (index, entry) in sidebar.entries().iter().enumerate() {
            if entry.section == Some(section) {
                line(index, "  ", &mut out);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use handbook_client::NavigationDocument;
    use handbook_core::PolicyId;

    fn sidebar() -> Sidebar {
        let doc: NavigationDocument = serde_json::from_value(serde_json::json!({
            "introduction": {"href": "/handbook/introduction/content/"},
            "sections": [
                {"number": "1.0", "title": "Employment", "policies": [
                    {"id": 7, "number": "1.1", "title": "Hiring", "href": "/handbook/policy/7/content/"}
                ]},
                {"number": "2.0", "title": "Workplace", "policies": []}
            ]
        }))
        .unwrap();
        Sidebar::from_navigation(&doc)
    }

    #[test]
    fn renders_markers() {
        let mut sidebar = sidebar();
        sidebar.sync(PolicyId::new(7).unwrap());
        let text = render_sidebar(&sidebar);
        assert_eq!(
            text,
            "  [0] Introduction\n+ 1.0 Employment\n  * [1] 1.1 Hiring\n- 2.0 Workplace\n"
        );
    }
}
