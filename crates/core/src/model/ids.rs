use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a catalog Unit.
///
/// Serialized as a bare integer so stored progress payloads match the
/// `completedUnits` array format used by existing LMS records.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new `UnitId`
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a `UnitId` from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError;

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse UnitId from string")
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for UnitId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>().map(UnitId::new).map_err(|_| ParseIdError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_id_display() {
        let id = UnitId::new(7);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_unit_id_from_str() {
        let id: UnitId = "3".parse().unwrap();
        assert_eq!(id, UnitId::new(3));
    }

    #[test]
    fn test_unit_id_from_str_invalid() {
        assert!("seven".parse::<UnitId>().is_err());
        assert!("-1".parse::<UnitId>().is_err());
    }

    #[test]
    fn test_unit_id_serializes_as_integer() {
        let json = serde_json::to_string(&UnitId::new(4)).unwrap();
        assert_eq!(json, "4");
        let back: UnitId = serde_json::from_str("4").unwrap();
        assert_eq!(back, UnitId::new(4));
    }
}
