use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an Attempt.
///
/// Attempt ids are minted by the backend when an attempt is started; the
/// engine treats them as opaque.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Wraps an existing backend-issued id.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying `Uuid`.
    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Unique identifier for a test template (the exam definition an attempt
/// is started from).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestTemplateId(Uuid);

impl TestTemplateId {
    /// Wraps an existing backend-issued id.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying `Uuid`.
    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.0)
    }
}

impl fmt::Debug for TestTemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TestTemplateId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TestTemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing an id from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for AttemptId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(AttemptId::new)
            .map_err(|_| ParseIdError { kind: "AttemptId" })
    }
}

impl FromStr for TestTemplateId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(TestTemplateId::new)
            .map_err(|_| ParseIdError {
                kind: "TestTemplateId",
            })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "9f3c1e1e-7d3a-4a53-9c2b-0f5c6d1a2b3c";

    #[test]
    fn attempt_id_display_round_trips() {
        let id: AttemptId = SAMPLE.parse().unwrap();
        assert_eq!(id.to_string(), SAMPLE);
        let again: AttemptId = id.to_string().parse().unwrap();
        assert_eq!(id, again);
    }

    #[test]
    fn attempt_id_rejects_garbage() {
        let result = "not-a-uuid".parse::<AttemptId>();
        assert!(result.is_err());
    }

    #[test]
    fn template_id_from_str() {
        let id: TestTemplateId = SAMPLE.parse().unwrap();
        assert_eq!(id.value(), Uuid::parse_str(SAMPLE).unwrap());
    }

    #[test]
    fn ids_of_different_kinds_share_uuid_but_not_type() {
        let raw = Uuid::parse_str(SAMPLE).unwrap();
        let attempt = AttemptId::new(raw);
        let template = TestTemplateId::new(raw);
        assert_eq!(attempt.value(), template.value());
    }
}
