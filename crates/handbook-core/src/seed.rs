//! # Seed Files
//!
//! YAML description of a handbook used to populate the server at startup
//! and by `handbook validate`. Policy numbers are never written in the file;
//! they follow from the order policies are listed within their section.
//!
//! ```yaml
//! sections:
//!   - number: "1.0"
//!     title: Employment
//!     policies:
//!       - id: 7
//!         title: Hiring
//!         owner: Human Resources
//!         review_period: Annually
//!         related: [42]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::HandbookError;
use crate::handbook::{Handbook, PolicyDraft};
use crate::identity::{PolicyId, SectionNumber};
use crate::model::{Definition, ReviewPeriod, Section};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("seed file is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("seed section {section}: {source}")]
    Section {
        section: String,
        #[source]
        source: HandbookError,
    },

    #[error("seed policy {title:?}: {source}")]
    Policy {
        title: String,
        #[source]
        source: HandbookError,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandbookSeed {
    #[serde(default)]
    pub sections: Vec<SectionSeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSeed {
    pub number: SectionNumber,
    pub title: String,
    #[serde(default)]
    pub policies: Vec<PolicySeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySeed {
    pub id: Option<PolicyId>,
    pub title: String,
    pub purpose: Option<String>,
    pub scope: Option<String>,
    pub policy_statements: Option<String>,
    pub responsibilities: Option<String>,
    #[serde(default)]
    pub definitions: Vec<DefinitionSeed>,
    #[serde(default)]
    pub procedure_steps: Vec<String>,
    pub owner: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    pub review_period: Option<ReviewPeriod>,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub related: Vec<PolicyId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionSeed {
    pub term: String,
    pub definition: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_published() -> bool {
    true
}

impl HandbookSeed {
    pub fn from_yaml(text: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Build the aggregate. Related links are resolved after every policy
    /// exists, so a policy may reference one listed later in the file.
    pub fn into_handbook(self) -> Result<Handbook, SeedError> {
        let mut handbook = Handbook::new();
        let mut links: Vec<(PolicyId, String, Vec<PolicyId>)> = Vec::new();

        for section in self.sections {
            let number = section.number;
            Section::new(number, section.title)
                .map_err(HandbookError::from)
                .and_then(|s| handbook.add_section(s))
                .map_err(|source| SeedError::Section {
                    section: number.to_string(),
                    source,
                })?;

            for policy in section.policies {
                let title = policy.title.clone();
                let related = policy.related.clone();
                let id = policy
                    .into_draft()
                    .and_then(|draft| handbook.add_policy(number, draft))
                    .map_err(|source| SeedError::Policy {
                        title: title.clone(),
                        source,
                    })?;
                if !related.is_empty() {
                    links.push((id, title, related));
                }
            }
        }

        for (id, title, related) in links {
            handbook
                .set_related(id, related)
                .map_err(|source| SeedError::Policy { title, source })?;
        }
        Ok(handbook)
    }
}

impl PolicySeed {
    fn into_draft(self) -> Result<PolicyDraft, HandbookError> {
        let definitions = self
            .definitions
            .into_iter()
            .map(|d| Definition::new(d.term, d.definition))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PolicyDraft {
            id: self.id,
            title: self.title,
            purpose: self.purpose,
            scope: self.scope,
            policy_statements: self.policy_statements,
            responsibilities: self.responsibilities,
            definitions,
            procedure_steps: self.procedure_steps,
            owner: self.owner,
            version: self.version,
            review_period: self.review_period,
            published: self.published,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
sections:
  - number: "1.0"
    title: Employment
    policies:
      - id: 7
        title: Hiring
        owner: Human Resources
        review_period: Annually
        procedure_steps:
          - Post the vacancy
          - Interview candidates
        definitions:
          - term: Candidate
            definition: A person applying for a vacancy.
        related: [42]
      - title: Probation
        published: false
  - number: "2.0"
    title: Workplace
    policies:
      - id: 42
        title: Remote Work
        version: "2.1"
        review_period: Bi-Annually
"#;

    #[test]
    fn sample_seed_builds_a_handbook() {
        let hb = HandbookSeed::from_yaml(SAMPLE).unwrap().into_handbook().unwrap();
        assert_eq!(hb.section_count(), 2);
        assert_eq!(hb.policy_count(), 3);

        let hiring = hb.policy(PolicyId::new(7).unwrap()).unwrap();
        assert_eq!(hiring.number.to_string(), "1.1");
        assert_eq!(hiring.procedure_steps.len(), 2);
        assert_eq!(hiring.related, vec![PolicyId::new(42).unwrap()]);

        // Auto ID follows the highest pinned one seen so far.
        let probation = hb.policy_by_number("1.2".parse().unwrap()).unwrap();
        assert_eq!(probation.id.get(), 8);
        assert!(!probation.published);

        let remote = hb.policy(PolicyId::new(42).unwrap()).unwrap();
        assert_eq!(remote.number.to_string(), "2.1");
        assert_eq!(remote.review_period, Some(ReviewPeriod::BiAnnually));
    }

    #[test]
    fn bad_section_number_fails_to_parse() {
        let yaml = "sections:\n  - number: \"1.5\"\n    title: Odd\n";
        assert!(matches!(HandbookSeed::from_yaml(yaml), Err(SeedError::Parse(_))));
    }

    #[test]
    fn dangling_related_reference_is_reported() {
        let yaml = r#"
sections:
  - number: "1.0"
    title: Employment
    policies:
      - id: 1
        title: Hiring
        related: [99]
"#;
        let err = HandbookSeed::from_yaml(yaml).unwrap().into_handbook().unwrap_err();
        assert!(matches!(
            err,
            SeedError::Policy { source: HandbookError::PolicyNotFound(_), .. }
        ));
    }

    #[test]
    fn duplicate_section_title_is_reported() {
        let yaml = r#"
sections:
  - number: "1.0"
    title: Employment
  - number: "2.0"
    title: Employment
"#;
        let err = HandbookSeed::from_yaml(yaml).unwrap().into_handbook().unwrap_err();
        assert!(matches!(err, SeedError::Section { .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "sections:\n  - number: \"1.0\"\n    title: A\n    colour: red\n";
        assert!(HandbookSeed::from_yaml(yaml).is_err());
    }
}
