//! Handler priority ordinals.
//!
//! Declaration order is execution order: variants earlier in the enum sort
//! first under the derived [`Ord`], so `CRITICAL` handlers always run before
//! `BACKGROUND` ones. Ties within a priority fall back to registration order
//! because every handler snapshot is sorted with a stable sort.

use std::fmt;

/// Ordinal priority tag controlling handler order within a phase or state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Priority {
    Critical,
    High,
    Normal,
    Low,
    Background,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Normal => "NORMAL",
            Priority::Low => "LOW",
            Priority::Background => "BACKGROUND",
        };
        f.write_str(name)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}
