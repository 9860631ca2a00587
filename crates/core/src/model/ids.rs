use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyError {
    #[error("{kind} cannot be empty")]
    Empty { kind: &'static str },
}

/// Identifier of a catalog category (e.g. `MS_SQL`).
///
/// Stored verbatim: the identifier is part of every composite progress key,
/// so it is never trimmed or normalized. Whitespace-only values are rejected.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryId(String);

impl CategoryId {
    /// Creates a new `CategoryId`
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Empty` if the identifier is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, KeyError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(KeyError::Empty { kind: "category" });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a phase, unique within its category (e.g. `Phase-1.0`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhaseKey(String);

impl PhaseKey {
    /// Creates a new `PhaseKey`
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Empty` if the key is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, KeyError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(KeyError::Empty { kind: "phase key" });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Composite identifier of a sub-topic: `(category, phase, index)`.
///
/// Renders as `"{category}-{phaseKey}-{index}"`, the string the progress
/// store is keyed by.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SubtopicKey {
    category: CategoryId,
    phase: PhaseKey,
    index: usize,
}

impl SubtopicKey {
    #[must_use]
    pub fn new(category: CategoryId, phase: PhaseKey, index: usize) -> Self {
        Self {
            category,
            phase,
            index,
        }
    }

    #[must_use]
    pub fn category(&self) -> &CategoryId {
        &self.category
    }

    #[must_use]
    pub fn phase(&self) -> &PhaseKey {
        &self.phase
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Prefix shared by every sub-topic key of one phase, trailing separator included.
    #[must_use]
    pub fn phase_prefix(category: &CategoryId, phase: &PhaseKey) -> String {
        format!("{}-{}-", category.0, phase.0)
    }
}

impl TryFrom<String> for CategoryId {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CategoryId> for String {
    fn from(value: CategoryId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhaseKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhaseKey> for String {
    fn from(value: PhaseKey) -> Self {
        value.0
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Debug for PhaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhaseKey({})", self.0)
    }
}

impl fmt::Debug for SubtopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubtopicKey({self})")
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PhaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SubtopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.category, self.phase, self.index)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
