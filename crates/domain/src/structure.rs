//! Structure: a home shared by several devices.

use serde::{Deserialize, Serialize};

use crate::error::InvalidSnapshotError;
use crate::id::StructureId;

/// Snapshot of a remote structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Structure {
    pub structure_id: StructureId,
    pub name: Option<String>,
    pub away: Option<AwayState>,
}

impl Structure {
    /// # Errors
    ///
    /// Returns [`InvalidSnapshotError::StructureWithoutId`] when the
    /// structure has no identifier.
    pub fn validate(&self) -> Result<(), InvalidSnapshotError> {
        if self.structure_id.is_empty() {
            return Err(InvalidSnapshotError::StructureWithoutId);
        }
        Ok(())
    }

    /// Whether nobody is home, including automatic away.
    #[must_use]
    pub fn is_away(&self) -> bool {
        matches!(self.away, Some(AwayState::Away | AwayState::AutoAway))
    }
}

/// Occupancy of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AwayState {
    Home,
    Away,
    AutoAway,
    #[serde(other)]
    Unknown,
}

impl AwayState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
            Self::AutoAway => "auto-away",
            Self::Unknown => "unknown",
        }
    }
}
