//! Risk classification and the fail-safe fusion policy.
//!
//! Two independent assessments feed every acquisition cycle:
//!
//! ```text
//!   SensorSample ──▶ local::evaluate_local ──┐
//!                                            ├──▶ fuse() ──▶ AlertActuator
//!   SensorSample ──▶ remote::RemoteRiskClient┘
//! ```
//!
//! Fusion always keeps the higher severity, so an unreachable remote model
//! can never suppress a local finding.

pub mod local;
pub mod remote;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Ordered severity classification.
///
/// Variant order defines the total order used by [`fuse`]:
/// `Normal < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl RiskLevel {
    /// All levels in ascending severity.
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Normal, RiskLevel::Warning, RiskLevel::Critical];

    /// Short label for logs and the display.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fail-safe fusion: the more severe of the two assessments wins.
pub fn fuse(local: RiskLevel, remote: RiskLevel) -> RiskLevel {
    local.max(remote)
}

/// Per-cycle pairing of both assessments and their fused outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionResult {
    pub local: RiskLevel,
    pub remote: RiskLevel,
    pub fused: RiskLevel,
}

impl FusionResult {
    pub fn new(local: RiskLevel, remote: RiskLevel) -> Self {
        Self {
            local,
            remote,
            fused: fuse(local, remote),
        }
    }

    /// True when the remote model raised the level above the local finding.
    pub fn escalated_by_remote(&self) -> bool {
        self.remote > self.local
    }
}
