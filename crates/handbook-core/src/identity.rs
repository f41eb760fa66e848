//! # Identifier Newtypes
//!
//! Each identifier is a distinct type: a [`PolicyNumber`] (`3.2`, the
//! human-facing label) cannot be passed where a [`PolicyId`] (the stable
//! database key used in URLs) is expected.
//!
//! All three validate at construction and at deserialization time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through `FromStr` so invalid values are rejected at deserialization time.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

macro_rules! impl_display_serialize {
    ($ty:ident) => {
        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }
    };
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// PolicyId
// ---------------------------------------------------------------------------

/// Stable identifier of a policy. Positive integer; appears in content URLs
/// (`/handbook/policy/{id}/content/`) and in the `?policy=` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PolicyId(u64);

impl PolicyId {
    /// Wrap a raw ID. Zero is rejected.
    pub fn new(raw: u64) -> Result<Self, ValidationError> {
        if raw == 0 {
            return Err(ValidationError::InvalidPolicyId(raw.to_string()));
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PolicyId {
    type Err = ValidationError;

    /// Accepts only plain ASCII digits: no sign, no whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !all_digits(s) {
            return Err(ValidationError::InvalidPolicyId(s.to_string()));
        }
        let raw: u64 = s
            .parse()
            .map_err(|_| ValidationError::InvalidPolicyId(s.to_string()))?;
        Self::new(raw).map_err(|_| ValidationError::InvalidPolicyId(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for PolicyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// SectionNumber
// ---------------------------------------------------------------------------

/// Number of a handbook section, always of the form `X.0`.
///
/// Leading zeros are normalized away (`01.0` is section `1.0`), so two
/// spellings of the same number compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionNumber {
    prefix: u32,
}

impl SectionNumber {
    pub fn new(prefix: u32) -> Self {
        Self { prefix }
    }

    /// The integer part shared with every policy number in this section.
    pub fn prefix(&self) -> u32 {
        self.prefix
    }
}

impl fmt::Display for SectionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.0", self.prefix)
    }
}

impl FromStr for SectionNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidSectionNumber(s.to_string());
        let head = s.strip_suffix(".0").ok_or_else(invalid)?;
        if !all_digits(head) {
            return Err(invalid());
        }
        let prefix = head.parse().map_err(|_| invalid())?;
        Ok(Self { prefix })
    }
}

impl_validating_deserialize!(SectionNumber);
impl_display_serialize!(SectionNumber);

// ---------------------------------------------------------------------------
// PolicyNumber
// ---------------------------------------------------------------------------

/// Display number of a policy: `{section prefix}.{index}`, index from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyNumber {
    prefix: u32,
    index: u32,
}

impl PolicyNumber {
    /// Number for the `index`-th policy (1-based) of `section`.
    pub fn new(section: SectionNumber, index: u32) -> Result<Self, ValidationError> {
        if index == 0 {
            return Err(ValidationError::InvalidPolicyNumber(format!(
                "{}.0",
                section.prefix()
            )));
        }
        Ok(Self {
            prefix: section.prefix(),
            index,
        })
    }

    pub fn prefix(&self) -> u32 {
        self.prefix
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn belongs_to(&self, section: SectionNumber) -> bool {
        self.prefix == section.prefix()
    }

    /// Reject a number that does not carry `section`'s prefix.
    pub fn ensure_in(&self, section: SectionNumber) -> Result<(), ValidationError> {
        if self.belongs_to(section) {
            Ok(())
        } else {
            Err(ValidationError::SectionMismatch {
                number: self.to_string(),
                section: section.to_string(),
            })
        }
    }
}

impl fmt::Display for PolicyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.prefix, self.index)
    }
}

impl FromStr for PolicyNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidPolicyNumber(s.to_string());
        let (head, tail) = s.split_once('.').ok_or_else(invalid)?;
        if !all_digits(head) || !all_digits(tail) {
            return Err(invalid());
        }
        let prefix = head.parse().map_err(|_| invalid())?;
        let index: u32 = tail.parse().map_err(|_| invalid())?;
        if index == 0 {
            return Err(invalid());
        }
        Ok(Self { prefix, index })
    }
}

impl_validating_deserialize!(PolicyNumber);
impl_display_serialize!(PolicyNumber);
