//! # Content Fragments
//!
//! Askama templates for the two markup fragments the browsing client swaps
//! into its content region. Stored text is auto-escaped. The only raw value
//! is the related-policy `data-url`, which is built from an integer ID.

use askama::Template;
use handbook_core::{policy_content_path, Definition, Handbook, Policy, ProcedureStep};

use crate::error::AppError;

pub struct SectionSummary {
    pub number: String,
    pub title: String,
    pub policy_count: usize,
}

#[derive(Template)]
#[template(path = "fragments/introduction.html")]
pub struct IntroductionTemplate {
    pub title: String,
    pub sections: Vec<SectionSummary>,
}

pub struct PolicyPart<'a> {
    pub heading: &'static str,
    pub body: &'a str,
}

pub struct RelatedLink {
    pub href: String,
    pub label: String,
}

#[derive(Template)]
#[template(path = "fragments/policy.html")]
pub struct PolicyTemplate<'a> {
    pub id: u64,
    pub heading: String,
    pub version: &'a str,
    pub owner: Option<&'a str>,
    pub review_period: Option<&'static str>,
    pub parts: Vec<PolicyPart<'a>>,
    pub steps: &'a [ProcedureStep],
    pub definitions: &'a [Definition],
    pub related: Vec<RelatedLink>,
}

/// Introduction fragment: title plus published policy counts per section.
pub fn render_introduction(handbook: &Handbook, title: &str) -> Result<String, AppError> {
    let sections = handbook
        .sections()
        .map(|s| SectionSummary {
            number: s.number.to_string(),
            title: s.title.clone(),
            policy_count: handbook
                .policies_in(s.number)
                .iter()
                .filter(|p| p.published)
                .count(),
        })
        .collect();
    let template = IntroductionTemplate {
        title: title.to_string(),
        sections,
    };
    Ok(template.render()?)
}

/// Policy fragment, with one related-policy trigger per published target.
pub fn render_policy(handbook: &Handbook, policy: &Policy) -> Result<String, AppError> {
    let parts = [
        ("Purpose", policy.purpose.as_deref()),
        ("Scope", policy.scope.as_deref()),
        ("Policy Statements", policy.policy_statements.as_deref()),
        ("Responsibilities", policy.responsibilities.as_deref()),
    ]
    .into_iter()
    .filter_map(|(heading, body)| {
        body.filter(|b| !b.trim().is_empty())
            .map(|body| PolicyPart { heading, body })
    })
    .collect();

    let related = handbook
        .related_of(policy.id)
        .into_iter()
        .map(|target| RelatedLink {
            href: policy_content_path(target.id),
            label: target.heading(),
        })
        .collect();

    let template = PolicyTemplate {
        id: policy.id.get(),
        heading: policy.heading(),
        version: &policy.version,
        owner: policy.owner.as_deref(),
        review_period: policy.review_period.map(|r| r.as_str()),
        parts,
        steps: &policy.procedure_steps,
        definitions: &policy.definitions,
        related,
    };
    Ok(template.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use handbook_core::{PolicyDraft, PolicyId, ReviewPeriod, Section, SectionNumber};

    fn handbook() -> (Handbook, PolicyId, PolicyId) {
        let mut hb = Handbook::new();
        let s1: SectionNumber = "1.0".parse().unwrap();
        hb.add_section(Section::new(s1, "Employment").unwrap()).unwrap();

        let mut draft = PolicyDraft::new("Hiring <Fair> & Square");
        draft.purpose = Some("Hire \"well\"".into());
        draft.owner = Some("HR".into());
        draft.review_period = Some(ReviewPeriod::Annually);
        draft.procedure_steps = vec!["Advertise".into(), "Interview".into()];
        draft.definitions = vec![Definition::new("Candidate", "An applicant").unwrap()];
        let hiring = hb.add_policy(s1, draft.with_id(PolicyId::new(7).unwrap())).unwrap();

        let leave = hb
            .add_policy(s1, PolicyDraft::new("Leave").with_id(PolicyId::new(42).unwrap()))
            .unwrap();
        hb.set_related(hiring, vec![leave]).unwrap();
        (hb, hiring, leave)
    }

    #[test]
    fn policy_fragment_escapes_stored_text() {
        let (hb, hiring, _) = handbook();
        let html = render_policy(&hb, hb.policy(hiring).unwrap()).unwrap();
        assert!(html.contains("1.1 Hiring &lt;Fair&gt; &amp; Square"));
        assert!(!html.contains("<Fair>"));
        assert!(html.contains("Hire &quot;well&quot;") || html.contains("Hire &#34;well&#34;"));
    }

    #[test]
    fn policy_fragment_carries_related_trigger() {
        let (hb, hiring, _) = handbook();
        let html = render_policy(&hb, hb.policy(hiring).unwrap()).unwrap();
        assert!(html.contains(
            r#"<button type="button" class="related-policy-btn" data-url="/handbook/policy/42/content/">1.2 Leave</button>"#
        ));
    }

    #[test]
    fn policy_fragment_lists_steps_in_order() {
        let (hb, hiring, _) = handbook();
        let html = render_policy(&hb, hb.policy(hiring).unwrap()).unwrap();
        let advertise = html.find("Advertise").unwrap();
        let interview = html.find("Interview").unwrap();
        assert!(advertise < interview);
        assert!(html.contains("Annually"));
        assert!(html.contains("Candidate"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let (hb, _, leave) = handbook();
        let html = render_policy(&hb, hb.policy(leave).unwrap()).unwrap();
        assert!(!html.contains("Procedure"));
        assert!(!html.contains("related-policy-btn"));
    }

    #[test]
    fn introduction_lists_sections() {
        let (hb, _, _) = handbook();
        let html = render_introduction(&hb, "Employee Handbook").unwrap();
        assert!(html.contains("<h1>Employee Handbook</h1>"));
        assert!(html.contains("Employment"));
        assert!(!html.contains("data-url"));
    }
}
