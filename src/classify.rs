//! Extension-based danger classification
//!
//! A pure derivation of (object name, policy) with no side effects. The
//! two modes deliberately disagree on names with unusual extensions:
//! suffix-length-four flags any four-character extension including benign
//! ones, while blocklist flags only configured members. They stay separate
//! policies rather than one unified rule.

use crate::config::Config;
use crate::types::{Classification, RenameMode};

/// Classify an object name against the active policy.
///
/// A name already carrying the quarantine suffix (any case) is never
/// dangerous, so quarantined objects do not loop back through a second
/// rename. A name without a `.` has no extension and is never dangerous.
pub fn classify(name: &str, config: &Config) -> Classification {
    Classification {
        name: name.to_string(),
        dangerous: is_dangerous(name, config),
        mode: config.mode,
    }
}

fn is_dangerous(name: &str, config: &Config) -> bool {
    let lowered = name.to_lowercase();
    if lowered.ends_with(&config.quarantine_suffix) {
        return false;
    }
    let Some(dot) = lowered.rfind('.') else {
        return false;
    };
    // Extension runs from the last dot to the end, dot included.
    let ext = &lowered[dot..];
    match config.mode {
        RenameMode::Blocklist => config.blocklist.contains(ext),
        RenameMode::SuffixLengthFour => ext.chars().count() == 4,
    }
}
