//! Severity levels and tag-based resolution.
//!
//! # Responsibilities
//! - Define the ordered severity enumeration
//! - Resolve a severity from an event's tag set
//! - Map severities to collector wire levels
//!
//! # Design Decisions
//! - Ranked lookup: a higher-precedence tag wins when several are present
//! - Tag sets with no recognized severity tag fall back to `Log`
//! - `Log` has no tag of its own and ships at the `debug` wire level

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::TagSet;

/// Severity of a report, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    /// Fallback for events carrying no recognized severity tag.
    Log,
}

/// Tag lookup order. `Log` is the fallback and is never matched by tag.
const RANKED: [Severity; 5] = [
    Severity::Critical,
    Severity::Error,
    Severity::Warning,
    Severity::Info,
    Severity::Debug,
];

impl Severity {
    /// Tag string recognized for this level.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
            Severity::Log => "log",
        }
    }

    /// Level name transmitted to the collector.
    pub fn wire_level(self) -> &'static str {
        match self {
            Severity::Log => "debug",
            other => other.tag(),
        }
    }

    /// Rank used for client-side level gating. Higher is more severe.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 5,
            Severity::Error => 4,
            Severity::Warning => 3,
            Severity::Info => 2,
            Severity::Debug | Severity::Log => 1,
        }
    }

    /// Resolve the severity for an event's tag set.
    ///
    /// Checks the ranked levels in precedence order and returns the first
    /// whose tag is present, `Log` when none match.
    pub fn resolve(tags: &TagSet) -> Severity {
        for level in RANKED {
            if tags.contains(level.tag()) {
                return level;
            }
        }
        Severity::Log
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_beats_lower_precedence_tags() {
        let tags = TagSet::from(["debug", "error", "info"]);
        assert_eq!(Severity::resolve(&tags), Severity::Error);
    }

    #[test]
    fn critical_beats_error() {
        let tags = TagSet::from(["error", "critical"]);
        assert_eq!(Severity::resolve(&tags), Severity::Critical);
    }

    #[test]
    fn unrecognized_tags_resolve_to_log() {
        assert_eq!(Severity::resolve(&TagSet::from(["rollbar"])), Severity::Log);
        assert_eq!(Severity::resolve(&TagSet::new()), Severity::Log);
    }

    #[test]
    fn log_ships_as_debug() {
        assert_eq!(Severity::Log.wire_level(), "debug");
        assert_eq!(Severity::Error.wire_level(), "error");
    }

    #[test]
    fn rank_orders_levels() {
        assert!(Severity::Critical.rank() > Severity::Error.rank());
        assert!(Severity::Error.rank() > Severity::Warning.rank());
        assert_eq!(Severity::Log.rank(), Severity::Debug.rank());
    }
}
