//! # Handbook Records
//!
//! Plain data records for sections, policies and their parts. Invariants
//! that span records (numbering, uniqueness, related-policy references) are
//! enforced by [`crate::Handbook`], not here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{require_text, ValidationError};
use crate::identity::{PolicyId, PolicyNumber, SectionNumber};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_TERM_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_QUESTION_LEN: usize = 5_000;

/// A top-level handbook section, e.g. `1.0 Employment Policies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub number: SectionNumber,
    pub title: String,
}

impl Section {
    pub fn new(number: SectionNumber, title: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        require_text("section title", &title, MAX_TITLE_LEN)?;
        Ok(Self { number, title })
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.title)
    }
}

/// How often a policy is due for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewPeriod {
    Monthly,
    Quarterly,
    Annually,
    #[serde(rename = "Bi-Annually")]
    BiAnnually,
    Biennially,
}

impl ReviewPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Annually => "Annually",
            Self::BiAnnually => "Bi-Annually",
            Self::Biennially => "Biennially",
        }
    }
}

impl fmt::Display for ReviewPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Monthly" => Ok(Self::Monthly),
            "Quarterly" => Ok(Self::Quarterly),
            "Annually" => Ok(Self::Annually),
            "Bi-Annually" => Ok(Self::BiAnnually),
            "Biennially" => Ok(Self::Biennially),
            other => Err(ValidationError::InvalidReviewPeriod(other.to_string())),
        }
    }
}

/// One numbered step of a policy's procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureStep {
    pub step_number: u32,
    pub description: String,
}

/// A glossary term attached to a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub definition: String,
}

impl Definition {
    pub fn new(
        term: impl Into<String>,
        definition: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let term = term.into();
        require_text("definition term", &term, MAX_TERM_LEN)?;
        Ok(Self {
            term,
            definition: definition.into(),
        })
    }
}

/// A single handbook policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub section: SectionNumber,
    pub number: PolicyNumber,
    pub title: String,
    pub purpose: Option<String>,
    pub scope: Option<String>,
    pub policy_statements: Option<String>,
    pub responsibilities: Option<String>,
    /// Outgoing references; not symmetric.
    pub related: Vec<PolicyId>,
    pub definitions: Vec<Definition>,
    /// Kept sorted by `step_number`.
    pub procedure_steps: Vec<ProcedureStep>,
    /// Owning department.
    pub owner: Option<String>,
    pub version: String,
    pub review_period: Option<ReviewPeriod>,
    pub published: bool,
}

impl Policy {
    /// `"3.2 Remote Work"`.
    pub fn heading(&self) -> String {
        format!("{} {}", self.number, self.title)
    }

    /// Append a step numbered one past the current maximum.
    pub fn push_step(&mut self, description: impl Into<String>) -> u32 {
        let next = self
            .procedure_steps
            .iter()
            .map(|s| s.step_number)
            .max()
            .unwrap_or(0)
            + 1;
        self.procedure_steps.push(ProcedureStep {
            step_number: next,
            description: description.into(),
        });
        next
    }

    /// Insert a step with an explicit number, keeping the list ordered.
    pub fn insert_step(&mut self, step: ProcedureStep) {
        let at = self
            .procedure_steps
            .partition_point(|s| s.step_number <= step.step_number);
        self.procedure_steps.insert(at, step);
    }
}

/// Validate a `major.minor` version label.
pub fn validate_version(version: &str) -> Result<(), ValidationError> {
    let ok = version
        .split_once('.')
        .map(|(major, minor)| {
            !major.is_empty()
                && !minor.is_empty()
                && major.bytes().all(|b| b.is_ascii_digit())
                && minor.bytes().all(|b| b.is_ascii_digit())
        })
        .unwrap_or(false);
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidVersion(version.to_string()))
    }
}

/// A question an employee submitted about a specific policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRequest {
    pub policy: PolicyNumber,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub question: String,
    pub submitted_at: DateTime<Utc>,
    pub resolved: bool,
}

impl PolicyRequest {
    pub fn new(
        policy: PolicyNumber,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        question: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let email = email.into();
        let question = question.into();

        require_text("first_name", &first_name, MAX_NAME_LEN)?;
        require_text("last_name", &last_name, MAX_NAME_LEN)?;
        require_text("email", &email, MAX_EMAIL_LEN)?;
        require_text("question", &question, MAX_QUESTION_LEN)?;
        let well_formed = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !well_formed {
            return Err(ValidationError::InvalidEmail(email));
        }

        Ok(Self {
            policy,
            first_name,
            last_name,
            email,
            question,
            submitted_at,
            resolved: false,
        })
    }
}
