//! # Display Surface
//!
//! The single content region. Every load replaces it wholesale, either with
//! fetched markup or with [`ERROR_NOTICE`]; nothing is ever appended.
//!
//! Related-policy triggers are elements carrying a `data-url` attribute.
//! They are found by scanning the inserted markup, so a replace both swaps
//! the content and yields the triggers that now exist.

use std::sync::OnceLock;

use regex::Regex;

/// Inline notice shown when a load fails.
pub const ERROR_NOTICE: &str =
    r#"<div class="alert alert-danger" role="alert">Failed to load content. Please try again later.</div>"#;

/// What the region currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Displayed {
    Blank,
    Introduction,
    Policy { url: String },
    Error,
}

/// A related-policy button found in displayed markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedTrigger {
    /// Position among the triggers of the current content.
    pub index: usize,
    /// Decoded `data-url` value.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySurface {
    markup: String,
    displayed: Displayed,
    scroll_offset: u32,
    triggers: Vec<RelatedTrigger>,
}

impl Default for DisplaySurface {
    fn default() -> Self {
        Self {
            markup: String::new(),
            displayed: Displayed::Blank,
            scroll_offset: 0,
            triggers: Vec::new(),
        }
    }
}

impl DisplaySurface {
    /// Replace the content and return the triggers present in the new
    /// markup. Previously bound triggers are discarded; the caller binds
    /// the returned list.
    pub fn replace(&mut self, markup: String, displayed: Displayed) -> Vec<RelatedTrigger> {
        let triggers = related_triggers(&markup);
        self.markup = markup;
        self.displayed = displayed;
        self.triggers.clear();
        triggers
    }

    /// Replace the content with the error notice. No triggers survive.
    pub fn show_error(&mut self) {
        self.markup = ERROR_NOTICE.to_string();
        self.displayed = Displayed::Error;
        self.triggers.clear();
    }

    pub fn bind(&mut self, triggers: Vec<RelatedTrigger>) {
        self.triggers = triggers;
    }

    pub fn trigger(&self, index: usize) -> Option<&RelatedTrigger> {
        self.triggers.get(index)
    }

    pub fn triggers(&self) -> &[RelatedTrigger] {
        &self.triggers
    }

    pub fn scroll_to(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn displayed(&self) -> &Displayed {
        &self.displayed
    }

    pub fn is_error(&self) -> bool {
        self.displayed == Displayed::Error
    }
}

/// Elements whose content is raw text, not markup.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute pattern compiles")
    })
}

/// Every `data-url` attribute value in `markup`, in document order.
///
/// Only real attributes of start tags count: comments, raw-text element
/// bodies, text content and other attributes' values are skipped.
pub fn related_triggers(markup: &str) -> Vec<RelatedTrigger> {
    start_tag_attributes(markup)
        .into_iter()
        .filter_map(|attributes| attribute_value(attributes, "data-url"))
        .map(decode_entities)
        .filter(|url| !url.is_empty())
        .enumerate()
        .map(|(index, url)| RelatedTrigger { index, url })
        .collect()
}

/// The attribute text (everything after the tag name) of each start tag.
fn start_tag_attributes(markup: &str) -> Vec<&str> {
    let bytes = markup.as_bytes();
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(offset) = markup[pos..].find('<') {
        let open = pos + offset;
        if markup[open..].starts_with("<!--") {
            match markup[open + 4..].find("-->") {
                Some(end) => pos = open + 4 + end + 3,
                None => break,
            }
            continue;
        }
        match bytes.get(open + 1) {
            Some(b) if b.is_ascii_alphabetic() => {
                let name_end = markup[open + 1..]
                    .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
                    .map_or(markup.len(), |i| open + 1 + i);
                let Some(close) = tag_close(bytes, name_end) else {
                    break;
                };
                tags.push(&markup[name_end..close]);
                pos = close + 1;

                let name = &markup[open + 1..name_end];
                if RAW_TEXT_ELEMENTS.iter().any(|raw| name.eq_ignore_ascii_case(raw)) {
                    pos = raw_text_end(markup, pos, name);
                }
            }
            Some(b'/' | b'!' | b'?') => match markup[open..].find('>') {
                Some(end) => pos = open + end + 1,
                None => break,
            },
            // A bare `<` in text.
            _ => pos = open + 1,
        }
    }
    tags
}

/// Index of the `>` closing a start tag, ignoring any inside quoted values.
fn tag_close(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    let mut after_equals = false;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some(i),
            b'=' => after_equals = true,
            quote @ (b'"' | b'\'') if after_equals => {
                i += 1 + bytes[i + 1..].iter().position(|&b| b == quote)?;
                after_equals = false;
            }
            b if b.is_ascii_whitespace() => {}
            _ => after_equals = false,
        }
        i += 1;
    }
    None
}

fn raw_text_end(markup: &str, from: usize, name: &str) -> usize {
    let closing = format!("</{}", name.to_ascii_lowercase());
    markup[from..]
        .to_ascii_lowercase()
        .find(&closing)
        .map_or(markup.len(), |i| from + i)
}

/// Value of the first attribute called `name`. Names compare
/// case-insensitively; a valueless attribute yields `""`.
fn attribute_value<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    attribute_pattern()
        .captures_iter(attributes)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .map(|caps| {
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str())
        })
}

/// Decode the character references an attribute value may carry.
///
/// Single pass: `&amp;lt;` decodes to `&lt;`, not `<`. Unknown references
/// are left as written.
pub fn decode_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').and_then(|end| decode_reference(&tail[1..end]).map(|c| (c, end))) {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn finds_triggers_in_document_order() {
        let markup = r#"
            <button type="button" class="related-policy-btn" data-url="/handbook/policy/7/content/">Hiring</button>
            <a data-url='/handbook/policy/42/content/'>Remote</a>
            <span data-urls="nope">x</span>
        "#;
        let triggers = related_triggers(markup);
        assert_eq!(triggers.len(), 2);
        assert_eq!(triggers[0].url, "/handbook/policy/7/content/");
        assert_eq!(triggers[1].index, 1);
        assert_eq!(triggers[1].url, "/handbook/policy/42/content/");
    }

    #[test]
    fn unquoted_values_are_found() {
        let triggers = related_triggers("<button data-url=/handbook/policy/7/content/>Hiring</button>");
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].url, "/handbook/policy/7/content/");

        let triggers = related_triggers("<a DATA-URL = /handbook/policy/42/content/ class=x>R</a>");
        assert_eq!(triggers[0].url, "/handbook/policy/42/content/");
    }

    #[test]
    fn lookalikes_outside_attributes_are_ignored() {
        let markup = r#"
            <!-- <button data-url="/handbook/policy/9/content/">old</button> -->
            <p title='x data-url="/handbook/policy/5/content/"'>See data-url="/handbook/policy/6/content/"</p>
            <script>let b = '<i data-url="/handbook/policy/3/content/">';</script>
            <img alt="a > b" data-url="/handbook/policy/2/content/">
        "#;
        let urls: Vec<_> = related_triggers(markup).into_iter().map(|t| t.url).collect();
        assert_eq!(urls, vec!["/handbook/policy/2/content/"]);
    }

    #[test]
    fn first_duplicate_attribute_wins() {
        let triggers = related_triggers(r#"<b data-url="/a/" data-url="/b/"></b><br/><i data-url></i>"#);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].url, "/a/");
    }

    #[test]
    fn attribute_values_are_decoded() {
        let triggers = related_triggers(r#"<b data-url="/p/1/?a=1&amp;b=&#50;">x</b>"#);
        assert_eq!(triggers[0].url, "/p/1/?a=1&b=2");
    }

    #[test]
    fn decoding_is_single_pass() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&#39;&#x2F;&quot;"), "'/\"");
        assert_eq!(decode_entities("a & b &bogus; &"), "a & b &bogus; &");
    }

    #[test]
    fn replace_discards_old_bindings() {
        let mut surface = DisplaySurface::default();
        let triggers = surface.replace(
            r#"<i data-url="/handbook/policy/7/content/"></i>"#.into(),
            Displayed::Introduction,
        );
        surface.bind(triggers);
        assert_eq!(surface.triggers().len(), 1);

        let triggers = surface.replace("<p>plain</p>".into(), Displayed::Introduction);
        assert!(triggers.is_empty());
        assert!(surface.trigger(0).is_none());
    }

    #[test]
    fn error_notice_replaces_everything() {
        let mut surface = DisplaySurface::default();
        let triggers = surface.replace(r#"<i data-url="/x/"></i>"#.into(), Displayed::Introduction);
        surface.bind(triggers);
        surface.show_error();
        assert_eq!(surface.markup(), ERROR_NOTICE);
        assert!(surface.is_error());
        assert!(surface.triggers().is_empty());
    }

    proptest! {
        #[test]
        fn text_without_ampersands_is_unchanged(s in "[^&]*") {
            prop_assert_eq!(decode_entities(&s), s);
        }

        #[test]
        fn text_without_tags_has_no_triggers(s in "[^<]*") {
            prop_assert!(related_triggers(&s).is_empty());
        }

        #[test]
        fn escaped_text_round_trips(s in ".*") {
            let escaped = s
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;")
                .replace('"', "&quot;")
                .replace('\'', "&#39;");
            prop_assert_eq!(decode_entities(&escaped), s);
        }
    }
}
