//! The hosting page URL and its `policy` query parameter.
//!
//! Rewrites are history replacements: the URL changes in place without a
//! reload or a new history entry. [`PageUrl::replacements`] counts them.

use handbook_core::{PolicyId, HANDBOOK_PAGE_PATH};
use url::Url;

pub const POLICY_PARAM: &str = "policy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    url: Url,
    replacements: usize,
}

impl PageUrl {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            replacements: 0,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self::new)
    }

    /// The handbook page under `base`, without a query.
    pub fn handbook_page(base: &Url) -> Result<Self, url::ParseError> {
        base.join(HANDBOOK_PAGE_PATH).map(Self::new)
    }

    /// Raw value of the first `policy` parameter, if present.
    pub fn raw_policy(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == POLICY_PARAM)
            .map(|(_, v)| v.into_owned())
    }

    /// The `policy` parameter as an ID. Present but unparsable values yield
    /// `None`; use [`raw_policy`](Self::raw_policy) to tell them apart.
    pub fn policy_id(&self) -> Option<PolicyId> {
        self.raw_policy()?.parse().ok()
    }

    /// Point the `policy` parameter at `id`, keeping other parameters and
    /// their order. An existing `policy` parameter keeps its position.
    pub fn set_policy(&mut self, id: PolicyId) {
        let value = id.to_string();
        let mut found = false;
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (k, v) in self.url.query_pairs() {
            if k == POLICY_PARAM {
                if !found {
                    pairs.push((k.into_owned(), value.clone()));
                    found = true;
                }
            } else {
                pairs.push((k.into_owned(), v.into_owned()));
            }
        }
        if !found {
            pairs.push((POLICY_PARAM.to_string(), value));
        }
        self.write_query(&pairs);
    }

    /// Drop every `policy` parameter, keeping the rest.
    pub fn clear_policy(&mut self) {
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| k != POLICY_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        self.write_query(&pairs);
    }

    fn write_query(&mut self, pairs: &[(String, String)]) {
        if pairs.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        self.replacements += 1;
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl std::fmt::Display for PageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}
