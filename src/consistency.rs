//! Consistency levels
//!
//! Forwarded opaquely with every store call. The reference node accepts and
//! ignores them; a replicated store interprets them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tunable consistency for reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consistency {
    /// Written to at least one node, hinted handoff included. Writes only.
    Any,

    /// One replica acknowledged / answered.
    One,

    /// `replication_factor / 2 + 1` replicas.
    Quorum,

    /// Quorum within the local datacenter.
    LocalQuorum,

    /// Quorum within every datacenter.
    EachQuorum,

    /// Every replica.
    All,
}

impl Consistency {
    /// `Any` has no meaning for reads
    pub fn is_valid_for_reads(self) -> bool {
        self != Consistency::Any
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Consistency::Any => "ANY",
            Consistency::One => "ONE",
            Consistency::Quorum => "QUORUM",
            Consistency::LocalQuorum => "LOCAL_QUORUM",
            Consistency::EachQuorum => "EACH_QUORUM",
            Consistency::All => "ALL",
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Consistency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "ANY" => Ok(Consistency::Any),
            "ONE" => Ok(Consistency::One),
            "QUORUM" => Ok(Consistency::Quorum),
            "LOCAL_QUORUM" => Ok(Consistency::LocalQuorum),
            "EACH_QUORUM" => Ok(Consistency::EachQuorum),
            "ALL" => Ok(Consistency::All),
            other => Err(format!("unknown consistency level: {}", other)),
        }
    }
}
