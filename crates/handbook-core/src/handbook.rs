//! # Handbook Aggregate
//!
//! [`Handbook`] owns every section and policy and is the only place that
//! assigns or rewrites policy numbers:
//!
//! - A new policy in section `X.0` gets `X.{n}` where `n` is one past the
//!   highest index already used in that section.
//! - Renumbering a section from `X.0` to `Y.0` rewrites its policies as
//!   `Y.1, Y.2, ...` in ascending policy-ID order, so creation order is kept.
//! - Related-policy references must name policies that exist.

use std::collections::BTreeMap;

use crate::error::{require_text, HandbookError};
use crate::identity::{PolicyId, PolicyNumber, SectionNumber};
use crate::model::{validate_version, Definition, Policy, ReviewPeriod, Section, MAX_TITLE_LEN};

/// Input for [`Handbook::add_policy`]. The number is always assigned by the
/// handbook; the ID may be pinned (seed files do this so URLs are stable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDraft {
    pub id: Option<PolicyId>,
    pub title: String,
    pub purpose: Option<String>,
    pub scope: Option<String>,
    pub policy_statements: Option<String>,
    pub responsibilities: Option<String>,
    pub definitions: Vec<Definition>,
    /// Step descriptions, numbered 1..n in order.
    pub procedure_steps: Vec<String>,
    pub owner: Option<String>,
    pub version: String,
    pub review_period: Option<ReviewPeriod>,
    pub published: bool,
}

impl PolicyDraft {
    /// A published version-1.0 draft with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            purpose: None,
            scope: None,
            policy_statements: None,
            responsibilities: None,
            definitions: Vec::new(),
            procedure_steps: Vec::new(),
            owner: None,
            version: "1.0".to_string(),
            review_period: None,
            published: true,
        }
    }

    pub fn with_id(mut self, id: PolicyId) -> Self {
        self.id = Some(id);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Handbook {
    sections: BTreeMap<SectionNumber, Section>,
    policies: BTreeMap<PolicyId, Policy>,
}

impl Handbook {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Sections ------------------------------------------------------------

    pub fn add_section(&mut self, section: Section) -> Result<(), HandbookError> {
        if self.sections.contains_key(&section.number) {
            return Err(HandbookError::DuplicateSectionNumber(section.number.to_string()));
        }
        if self.sections.values().any(|s| s.title == section.title) {
            return Err(HandbookError::DuplicateSectionTitle(section.title));
        }
        self.sections.insert(section.number, section);
        Ok(())
    }

    /// Sections in ascending number order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section(&self, number: SectionNumber) -> Option<&Section> {
        self.sections.get(&number)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Change a section's number and renumber its policies to match.
    pub fn renumber_section(
        &mut self,
        old: SectionNumber,
        new: SectionNumber,
    ) -> Result<(), HandbookError> {
        if old == new {
            return Ok(());
        }
        if !self.sections.contains_key(&old) {
            return Err(HandbookError::SectionNotFound(old.to_string()));
        }
        if self.sections.contains_key(&new) {
            return Err(HandbookError::DuplicateSectionNumber(new.to_string()));
        }

        let mut section = self
            .sections
            .remove(&old)
            .ok_or_else(|| HandbookError::SectionNotFound(old.to_string()))?;
        section.number = new;
        self.sections.insert(new, section);

        // BTreeMap iteration is ascending by ID.
        let mut index = 0u32;
        for policy in self.policies.values_mut().filter(|p| p.section == old) {
            index += 1;
            policy.section = new;
            policy.number = PolicyNumber::new(new, index)?;
        }
        Ok(())
    }

    // -- Policies ------------------------------------------------------------

    /// Create a policy in `section`, assigning its number (and its ID unless
    /// the draft pins one).
    pub fn add_policy(
        &mut self,
        section: SectionNumber,
        draft: PolicyDraft,
    ) -> Result<PolicyId, HandbookError> {
        if !self.sections.contains_key(&section) {
            return Err(HandbookError::SectionNotFound(section.to_string()));
        }
        require_text("policy title", &draft.title, MAX_TITLE_LEN)?;
        validate_version(&draft.version)?;

        let id = match draft.id {
            Some(id) if self.policies.contains_key(&id) => {
                return Err(HandbookError::DuplicatePolicyId(id))
            }
            Some(id) => id,
            None => self.next_id()?,
        };

        let next_index = self
            .policies
            .values()
            .filter(|p| p.section == section)
            .map(|p| p.number.index())
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| HandbookError::SectionFull(section.to_string()))?;
        let number = PolicyNumber::new(section, next_index)?;

        let mut policy = Policy {
            id,
            section,
            number,
            title: draft.title,
            purpose: draft.purpose,
            scope: draft.scope,
            policy_statements: draft.policy_statements,
            responsibilities: draft.responsibilities,
            related: Vec::new(),
            definitions: draft.definitions,
            procedure_steps: Vec::new(),
            owner: draft.owner,
            version: draft.version,
            review_period: draft.review_period,
            published: draft.published,
        };
        for step in draft.procedure_steps {
            policy.push_step(step);
        }

        self.policies.insert(id, policy);
        Ok(id)
    }

    /// Insert a fully formed policy, e.g. one loaded from the database.
    ///
    /// The stored number is kept but must carry the section's prefix and be
    /// unique. Related references are not checked here because rows may
    /// arrive in any order; call [`Handbook::check_references`] afterwards.
    pub fn restore_policy(&mut self, policy: Policy) -> Result<(), HandbookError> {
        if !self.sections.contains_key(&policy.section) {
            return Err(HandbookError::SectionNotFound(policy.section.to_string()));
        }
        policy.number.ensure_in(policy.section)?;
        require_text("policy title", &policy.title, MAX_TITLE_LEN)?;
        validate_version(&policy.version)?;
        if self.policies.contains_key(&policy.id) {
            return Err(HandbookError::DuplicatePolicyId(policy.id));
        }
        if self.policy_by_number(policy.number).is_some() {
            return Err(HandbookError::DuplicatePolicyNumber(policy.number.to_string()));
        }
        self.policies.insert(policy.id, policy);
        Ok(())
    }

    /// Replace the outgoing related-policy references of `id`.
    pub fn set_related(
        &mut self,
        id: PolicyId,
        related: Vec<PolicyId>,
    ) -> Result<(), HandbookError> {
        if let Some(missing) = related.iter().find(|r| !self.policies.contains_key(r)) {
            return Err(HandbookError::PolicyNotFound(*missing));
        }
        let policy = self
            .policies
            .get_mut(&id)
            .ok_or(HandbookError::PolicyNotFound(id))?;
        policy.related = related;
        Ok(())
    }

    /// Verify every related-policy reference resolves.
    pub fn check_references(&self) -> Result<(), HandbookError> {
        for policy in self.policies.values() {
            if let Some(missing) = policy
                .related
                .iter()
                .find(|r| !self.policies.contains_key(r))
            {
                return Err(HandbookError::PolicyNotFound(*missing));
            }
        }
        Ok(())
    }

    pub fn policy(&self, id: PolicyId) -> Option<&Policy> {
        self.policies.get(&id)
    }

    /// Like [`Handbook::policy`] but hides drafts.
    pub fn published_policy(&self, id: PolicyId) -> Option<&Policy> {
        self.policies.get(&id).filter(|p| p.published)
    }

    pub fn policy_by_number(&self, number: PolicyNumber) -> Option<&Policy> {
        self.policies.values().find(|p| p.number == number)
    }

    /// Policies of one section ordered by policy number.
    pub fn policies_in(&self, section: SectionNumber) -> Vec<&Policy> {
        let mut out: Vec<&Policy> = self
            .policies
            .values()
            .filter(|p| p.section == section)
            .collect();
        out.sort_by_key(|p| p.number);
        out
    }

    /// Published targets of `id`'s related references, in stored order.
    pub fn related_of(&self, id: PolicyId) -> Vec<&Policy> {
        self.policies
            .get(&id)
            .map(|p| {
                p.related
                    .iter()
                    .filter_map(|r| self.published_policy(*r))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    pub fn published_count(&self) -> usize {
        self.policies.values().filter(|p| p.published).count()
    }

    fn next_id(&self) -> Result<PolicyId, HandbookError> {
        let last = self.policies.keys().next_back().map(|id| id.get()).unwrap_or(0);
        let next = last.checked_add(1).ok_or(HandbookError::PolicyIdsExhausted)?;
        Ok(PolicyId::new(next)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use proptest::prelude::*;

    fn sn(s: &str) -> SectionNumber {
        s.parse().unwrap()
    }

    fn handbook_with_sections() -> Handbook {
        let mut hb = Handbook::new();
        hb.add_section(Section::new(sn("1.0"), "Employment").unwrap())
            .unwrap();
        hb.add_section(Section::new(sn("2.0"), "Workplace").unwrap())
            .unwrap();
        hb
    }

    #[test]
    fn policies_are_numbered_within_their_section() {
        let mut hb = handbook_with_sections();
        let a = hb.add_policy(sn("1.0"), PolicyDraft::new("Hiring")).unwrap();
        let b = hb.add_policy(sn("2.0"), PolicyDraft::new("Safety")).unwrap();
        let c = hb.add_policy(sn("1.0"), PolicyDraft::new("Leave")).unwrap();

        assert_eq!(hb.policy(a).unwrap().number.to_string(), "1.1");
        assert_eq!(hb.policy(b).unwrap().number.to_string(), "2.1");
        assert_eq!(hb.policy(c).unwrap().number.to_string(), "1.2");
        assert_eq!((a.get(), b.get(), c.get()), (1, 2, 3));
    }

    #[test]
    fn pinned_ids_are_honored_and_unique() {
        let mut hb = handbook_with_sections();
        let id = PolicyId::new(42).unwrap();
        assert_eq!(
            hb.add_policy(sn("1.0"), PolicyDraft::new("Hiring").with_id(id)),
            Ok(id)
        );
        assert_eq!(
            hb.add_policy(sn("1.0"), PolicyDraft::new("Again").with_id(id)),
            Err(HandbookError::DuplicatePolicyId(id))
        );
        // Auto IDs continue after the highest pinned one.
        assert_eq!(hb.add_policy(sn("1.0"), PolicyDraft::new("Next")).unwrap().get(), 43);
    }

    #[test]
    fn duplicate_sections_are_rejected() {
        let mut hb = handbook_with_sections();
        assert!(matches!(
            hb.add_section(Section::new(sn("1.0"), "Other").unwrap()),
            Err(HandbookError::DuplicateSectionNumber(_))
        ));
        assert!(matches!(
            hb.add_section(Section::new(sn("3.0"), "Employment").unwrap()),
            Err(HandbookError::DuplicateSectionTitle(_))
        ));
    }

    #[test]
    fn unknown_section_is_rejected() {
        let mut hb = handbook_with_sections();
        assert_eq!(
            hb.add_policy(sn("9.0"), PolicyDraft::new("Orphan")),
            Err(HandbookError::SectionNotFound("9.0".into()))
        );
    }

    #[test]
    fn renumbering_a_section_renumbers_its_policies_in_id_order() {
        let mut hb = handbook_with_sections();
        let a = hb.add_policy(sn("1.0"), PolicyDraft::new("A")).unwrap();
        let other = hb.add_policy(sn("2.0"), PolicyDraft::new("Other")).unwrap();
        let b = hb.add_policy(sn("1.0"), PolicyDraft::new("B")).unwrap();

        hb.renumber_section(sn("1.0"), sn("5.0")).unwrap();

        assert!(hb.section(sn("1.0")).is_none());
        assert_eq!(hb.section(sn("5.0")).unwrap().title, "Employment");
        assert_eq!(hb.policy(a).unwrap().number.to_string(), "5.1");
        assert_eq!(hb.policy(b).unwrap().number.to_string(), "5.2");
        assert_eq!(hb.policy(a).unwrap().section, sn("5.0"));
        assert_eq!(hb.policy(other).unwrap().number.to_string(), "2.1");
    }

    #[test]
    fn renumbering_onto_an_existing_section_fails() {
        let mut hb = handbook_with_sections();
        assert!(matches!(
            hb.renumber_section(sn("1.0"), sn("2.0")),
            Err(HandbookError::DuplicateSectionNumber(_))
        ));
    }

    #[test]
    fn restore_policy_checks_section_prefix() {
        let mut hb = handbook_with_sections();
        let id = hb.add_policy(sn("1.0"), PolicyDraft::new("A")).unwrap();
        let mut copy = hb.policy(id).unwrap().clone();
        copy.id = PolicyId::new(99).unwrap();
        copy.number = "2.1".parse().unwrap();
        assert!(matches!(
            hb.restore_policy(copy),
            Err(HandbookError::Validation(ValidationError::SectionMismatch { .. }))
        ));
    }

    #[test]
    fn full_section_rejects_new_policies() {
        let mut hb = handbook_with_sections();
        let id = hb.add_policy(sn("1.0"), PolicyDraft::new("A")).unwrap();
        let mut last = hb.policy(id).unwrap().clone();
        last.id = PolicyId::new(99).unwrap();
        last.number = PolicyNumber::new(sn("1.0"), u32::MAX).unwrap();
        hb.restore_policy(last).unwrap();

        assert_eq!(
            hb.add_policy(sn("1.0"), PolicyDraft::new("B")),
            Err(HandbookError::SectionFull("1.0".into()))
        );
        // Other sections still number normally.
        let other = hb.add_policy(sn("2.0"), PolicyDraft::new("C")).unwrap();
        assert_eq!(hb.policy(other).unwrap().number.to_string(), "2.1");
    }

    #[test]
    fn exhausted_ids_are_an_error() {
        let mut hb = handbook_with_sections();
        hb.add_policy(sn("1.0"), PolicyDraft::new("A").with_id(PolicyId::new(u64::MAX).unwrap()))
            .unwrap();
        assert_eq!(
            hb.add_policy(sn("1.0"), PolicyDraft::new("B")),
            Err(HandbookError::PolicyIdsExhausted)
        );
    }

    #[test]
    fn related_references_must_exist() {
        let mut hb = handbook_with_sections();
        let a = hb.add_policy(sn("1.0"), PolicyDraft::new("A")).unwrap();
        let b = hb.add_policy(sn("1.0"), PolicyDraft::new("B")).unwrap();
        let ghost = PolicyId::new(77).unwrap();

        assert_eq!(hb.set_related(a, vec![ghost]), Err(HandbookError::PolicyNotFound(ghost)));
        hb.set_related(a, vec![b]).unwrap();
        assert_eq!(hb.related_of(a).len(), 1);
        assert!(hb.check_references().is_ok());
    }

    #[test]
    fn unpublished_policies_are_hidden() {
        let mut hb = handbook_with_sections();
        let mut draft = PolicyDraft::new("Draft policy");
        draft.published = false;
        let id = hb.add_policy(sn("1.0"), draft).unwrap();
        let live = hb.add_policy(sn("1.0"), PolicyDraft::new("Live")).unwrap();
        hb.set_related(live, vec![id]).unwrap();

        assert!(hb.policy(id).is_some());
        assert!(hb.published_policy(id).is_none());
        assert!(hb.related_of(live).is_empty());
        assert_eq!(hb.published_count(), 1);
    }

    #[test]
    fn draft_steps_are_numbered_in_order() {
        let mut hb = handbook_with_sections();
        let mut draft = PolicyDraft::new("Steps");
        draft.procedure_steps = vec!["one".into(), "two".into()];
        let id = hb.add_policy(sn("1.0"), draft).unwrap();
        let steps = &hb.policy(id).unwrap().procedure_steps;
        assert_eq!(steps[0].step_number, 1);
        assert_eq!(steps[1].step_number, 2);
    }

    #[test]
    fn bad_version_is_rejected() {
        let mut hb = handbook_with_sections();
        let mut draft = PolicyDraft::new("Versioned");
        draft.version = "one".into();
        assert!(matches!(
            hb.add_policy(sn("1.0"), draft),
            Err(HandbookError::Validation(ValidationError::InvalidVersion(_)))
        ));
    }

    proptest! {
        #[test]
        fn numbering_is_dense_after_renumber(count in 1usize..20, target in 2u32..50) {
            let mut hb = handbook_with_sections();
            for i in 0..count {
                hb.add_policy(sn("1.0"), PolicyDraft::new(format!("P{i}"))).unwrap();
            }
            hb.renumber_section(sn("1.0"), SectionNumber::new(target)).unwrap();
            let indexes: Vec<u32> = hb
                .policies_in(SectionNumber::new(target))
                .iter()
                .map(|p| p.number.index())
                .collect();
            let expected: Vec<u32> = (1..=count as u32).collect();
            prop_assert_eq!(indexes, expected);
        }
    }
}
